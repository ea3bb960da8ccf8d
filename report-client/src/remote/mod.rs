//! Remote service boundary
//!
//! [`RemoteBackend`] is the typed contract the sync engine and the mutation
//! recorder depend on: row upserts/deletes keyed on `id`, join-expanded
//! report selects, append-only history inserts, object storage, and the
//! session lookup. [`RemoteService`] implements it over HTTP; tests script
//! their own implementation.

pub mod service;
pub mod types;

pub use service::RemoteService;
pub use types::{
    AttachmentUpsert, JoinedProfile, JoinedProject, RemoteAttachment, RemoteHistoryRow,
    RemoteProject, RemoteReport, ReportUpsert, Session, StatusHistoryInsert, UserRole,
};

use async_trait::async_trait;
use shared::AppError;
use thiserror::Error;

/// Public object URLs embed this prefix; splitting on it recovers the
/// storage path of an already-uploaded object for deletion.
pub const PUBLIC_OBJECT_PREFIX: &str = "/storage/v1/object/public/attachments/";

/// Remote service error types
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest buries the useful part in the source chain
        let mut msg = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(s) = source {
            msg.push_str(&format!(" → {s}"));
            source = s.source();
        }
        RemoteError::Network(msg)
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotAuthenticated => AppError::NotAuthenticated,
            other => AppError::Remote(other.to_string()),
        }
    }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// The remote service contract.
///
/// Exact shapes are a contract the sync engine depends on, not to be
/// altered casually.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    /// Install (or clear) the bearer token obtained by the external login
    /// layer. Backends without token auth ignore it.
    async fn set_access_token(&self, _token: Option<String>) {}

    /// Current authenticated identity, or `None` when logged out
    async fn current_session(&self) -> RemoteResult<Option<Session>>;

    /// Cheap reachability probe for the scheduler
    async fn check_connectivity(&self) -> bool;

    async fn fetch_projects(&self) -> RemoteResult<Vec<RemoteProject>>;

    /// Insert-or-overwrite keyed on `id` (last writer wins)
    async fn upsert_report(&self, payload: ReportUpsert) -> RemoteResult<()>;

    async fn delete_report(&self, id: &str) -> RemoteResult<()>;

    /// Append-only history insert
    async fn insert_status_history(&self, row: StatusHistoryInsert) -> RemoteResult<()>;

    /// Reports joined with creator name, assignee name, project, and the
    /// ordered audit-history list. Non-elevated identities see only their
    /// own reports.
    async fn fetch_reports(&self, user_id: &str, elevated: bool) -> RemoteResult<Vec<RemoteReport>>;

    async fn fetch_attachments(&self, report_id: &str) -> RemoteResult<Vec<RemoteAttachment>>;

    async fn upsert_attachment(&self, payload: AttachmentUpsert) -> RemoteResult<()>;

    async fn delete_attachment(&self, id: &str) -> RemoteResult<()>;

    /// Upload with overwrite-on-conflict
    async fn upload_object(&self, path: &str, bytes: Vec<u8>, mime: &str) -> RemoteResult<()>;

    /// Public URL for an uploaded object
    fn public_url(&self, path: &str) -> String;

    async fn delete_object(&self, path: &str) -> RemoteResult<()>;

    /// Derive the storage path back out of a stored public URL
    fn storage_path_from_url(&self, url: &str) -> Option<String> {
        url.split_once(PUBLIC_OBJECT_PREFIX)
            .map(|(_, path)| path.to_string())
    }
}
