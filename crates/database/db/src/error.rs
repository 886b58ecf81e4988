/// The error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// The requested key is not present in the off-chain data table.
    #[error("state not synchronized")]
    StateNotSynchronized,
    /// A write failed and the enclosing transaction was rolled back.
    #[error("{rollback}: rollback caused by {source}")]
    RolledBack {
        /// The error raised by the rollback itself.
        rollback: sea_orm::DbErr,
        /// The error that triggered the rollback.
        source: Box<DatabaseError>,
    },
}
