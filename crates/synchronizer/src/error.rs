use da_node_db::DatabaseError;
use da_node_l1::L1ClientError;

/// A [`Result`] that uses [`SynchronizerError`] as the error type.
pub type SynchronizerResult<T> = Result<T, SynchronizerError>;

/// An error raised during batch synchronization.
#[derive(Debug, thiserror::Error)]
pub enum SynchronizerError {
    /// An error raised by the L1 client.
    #[error(transparent)]
    L1(#[from] L1ClientError),
    /// An error raised by the durable store.
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
