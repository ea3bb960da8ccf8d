//! Domain models
//!
//! Wire-compatible serde names: the remote service stores the creator as
//! `user_id` and the assignee as `assigned_to`, statuses as capitalized
//! strings. Timestamps are Unix millis locally and RFC 3339 on the wire.

pub mod attachment;
pub mod project;
pub mod report;

pub use attachment::{Attachment, NewAttachment};
pub use project::Project;
pub use report::{NewReport, Report, ReportEdit, ReportStatus, ReportType, StatusChange};
