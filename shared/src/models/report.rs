//! Report model
//!
//! A report moves through a fixed status lifecycle:
//! Submitted → New → Open → Pending → Resolved → Closed.

use serde::{Deserialize, Serialize};

/// Report lifecycle status. Wire strings are the capitalized variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Submitted,
    New,
    Open,
    Pending,
    Resolved,
    Closed,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Report category, chosen at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportType {
    Attendance,
    Incident,
    Maintenance,
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One status transition, buffered locally until pushed.
///
/// Immutable once produced; the authoritative copy lives server-side after
/// the push and is re-fetched on pull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    /// Actor id
    pub changed_by: String,
    /// Actor display name, denormalized at recording time
    pub changed_by_name: String,
    /// Unix millis
    pub changed_at: i64,
    pub comment: Option<String>,
}

/// A trackable work item with sync metadata.
///
/// `id` is a client-generated UUID, assigned at creation and never
/// reassigned; it is the join key between the local store and the remote
/// store. The store keys records by it, so it is skipped on writes and
/// projected back on reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing)]
    pub id: String,
    /// Server-assigned display number, pull-only
    #[serde(default)]
    pub ticket_no: Option<String>,
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    /// Creator reference (`user_id` on the wire)
    #[serde(rename = "user_id")]
    pub creator_id: String,
    #[serde(default)]
    pub creator_name: Option<String>,
    /// Assignee reference (`assigned_to` on the wire)
    #[serde(rename = "assigned_to", default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub assignee_name: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    pub status: ReportStatus,
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<i64>,
    #[serde(default)]
    pub closed_at: Option<i64>,
    #[serde(default)]
    pub closing_notes: Option<String>,

    // -- Sync metadata, never shown to the user --
    /// false means "has local changes not yet pushed"
    pub synced: bool,
    /// true once at least one push succeeded; afterwards the creator
    /// reference is omitted from push payloads
    #[serde(default)]
    pub synced_once: bool,
    /// Tombstone: marked for deletion, awaiting the delete phase
    #[serde(default)]
    pub to_delete: bool,
    /// Locally-made audit entries awaiting push
    #[serde(default)]
    pub status_changes: Vec<StatusChange>,
}

/// Create-report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReport {
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    pub project_id: Option<String>,
}

/// Edit-report payload (field delta; `None` leaves the field untouched)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub report_type: Option<ReportType>,
    pub project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_capitalized() {
        let s = serde_json::to_string(&ReportStatus::Submitted).unwrap();
        assert_eq!(s, "\"Submitted\"");
        let back: ReportStatus = serde_json::from_str("\"Resolved\"").unwrap();
        assert_eq!(back, ReportStatus::Resolved);
    }

    #[test]
    fn report_write_omits_id_and_read_restores_it() {
        let report = Report {
            id: "r-1".into(),
            ticket_no: None,
            report_type: ReportType::Incident,
            title: "Broken lamp".into(),
            description: "Lamp in hall B".into(),
            creator_id: "u-1".into(),
            creator_name: None,
            assignee_id: None,
            assignee_name: None,
            project_id: None,
            project_name: None,
            status: ReportStatus::Submitted,
            created_at: 1,
            updated_at: None,
            updated_by: None,
            assigned_at: None,
            closed_at: None,
            closing_notes: None,
            synced: false,
            synced_once: false,
            to_delete: false,
            status_changes: vec![],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("id").is_none());
        assert_eq!(value["user_id"], "u-1");

        let mut value = value;
        value["id"] = serde_json::json!("r-1");
        let back: Report = serde_json::from_value(value).unwrap();
        assert_eq!(back.id, "r-1");
        assert_eq!(back.creator_id, "u-1");
    }
}
