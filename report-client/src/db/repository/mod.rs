//! Repository layer
//!
//! One repository per collection over the shared embedded database handle.
//! Records are keyed by the business UUID (`type::thing(table, id)`); reads
//! project `record::id(id) AS id` so models keep plain string ids.

pub mod attachment;
pub mod pending_delete;
pub mod project;
pub mod report;

pub use attachment::AttachmentRepository;
pub use pending_delete::{PendingDelete, PendingDeleteRepository};
pub use project::ProjectRepository;
pub use report::ReportRepository;

use shared::AppError;
use surrealdb::RecordId;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Store(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Record key for a collection + business id
pub(crate) fn record_key(table: &str, id: &str) -> RecordId {
    RecordId::from_table_key(table, id)
}
