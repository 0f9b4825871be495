use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from I/O operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from fingerprint content hashing
    #[error("Hashing error: {0}")]
    HashingError(String),
}

/// Result type for application
pub type AppResult<T> = Result<T, AppError>;
