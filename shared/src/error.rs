//! Application error type
//!
//! One error enum at the application boundary. Module-level error types
//! (store, remote) convert into this at the public surface.

/// Application error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No authenticated identity is available
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Local store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Remote service failure (network, HTTP status, storage)
    #[error("Remote error: {0}")]
    Remote(String),

    /// Record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for application-level operations
pub type AppResult<T> = Result<T, AppError>;
