use alloy_json_rpc::RpcError;
use alloy_primitives::B256;
use alloy_transport::TransportErrorKind;

/// A [`Result`] that uses [`L1ClientError`] as the error type.
pub type L1ClientResult<T> = Result<T, L1ClientError>;

/// An error raised by the L1 client.
#[derive(Debug, thiserror::Error)]
pub enum L1ClientError {
    /// An error at the RPC transport.
    #[error("transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    /// A contract call failed.
    #[error("contract error: {0}")]
    Contract(#[from] alloy_contract::Error),
    /// The requested block does not exist.
    #[error("missing block {0}")]
    MissingBlock(u64),
    /// The requested transaction does not exist.
    #[error("missing transaction {0}")]
    MissingTransaction(B256),
    /// A log is missing a field the client relies on.
    #[error("missing {0} on log")]
    MissingLogField(&'static str),
    /// A log failed to decode into the expected event.
    #[error("failed to decode {log_type} log: {source}")]
    DecodeLog {
        /// The event the log was expected to decode into.
        log_type: &'static str,
        /// The decoding error.
        #[source]
        source: alloy_sol_types::Error,
    },
}
