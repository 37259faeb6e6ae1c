use thiserror::Error;

/// Errors that can occur when interacting with order storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored state column held a literal that names no known state.
    #[error("Invalid order state in storage: {0:?}")]
    InvalidState(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
