/// Errors crossing the persistence boundary.
///
/// The sampling loop treats every insert as fire-and-forget: an error
/// here is logged and the cycle's record dropped, never retried.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The underlying database driver failed.
    #[error("Sink: database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic sink error for cases not covered by other variants.
    #[error("Sink: {0}")]
    Other(String),
}

/// Convenience `Result` alias for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
