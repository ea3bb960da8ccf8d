//! Attachment model

use serde::{Deserialize, Serialize};

/// A file bound to exactly one report.
///
/// Before upload the record holds the binary payload and no URL; after
/// upload it holds the remote public URL and no binary. Exactly one of the
/// two holds at any time except during the upload transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(skip_serializing)]
    pub id: String,
    pub report_id: String,
    /// Uploader reference (`user_id` on the wire)
    #[serde(rename = "user_id")]
    pub uploader_id: String,
    pub file_name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Remote public URL, set once uploaded
    #[serde(default)]
    pub file_url: Option<String>,
    /// Local binary payload, held only until upload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<Vec<u8>>,
    pub synced: bool,
    #[serde(default)]
    pub to_delete: bool,
}

/// Add-attachment payload
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub file_name: String,
    /// Explicit MIME metadata; resolved from the file name when absent
    pub mime_type: Option<String>,
    pub data: Vec<u8>,
}
