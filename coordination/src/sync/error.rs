use thiserror::Error;

/// Error type for sync channel operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session document not found: {0}")]
    NotFound(String),

    #[error("Channel closed")]
    ChannelClosed,

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for sync channel operations
pub type SyncResult<T> = Result<T, SyncError>;
