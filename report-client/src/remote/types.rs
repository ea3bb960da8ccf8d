//! Wire types for the remote service
//!
//! Push payloads serialize with the remote column names (`user_id`,
//! `assigned_to`); pulled rows carry RFC 3339 timestamps and are converted
//! into local models with Unix-millis fields.

use serde::{Deserialize, Serialize};
use shared::models::{Attachment, Project, Report, ReportStatus, ReportType, StatusChange};
use shared::util;

/// Authenticated identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

impl Session {
    /// Display name denormalized into audit entries
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| self.user_id.clone())
    }
}

/// Role of the authenticated identity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Reporter,
    Technician,
    Manager,
}

impl UserRole {
    /// Elevated roles pull every report, not just their own
    pub fn is_elevated(&self) -> bool {
        matches!(self, UserRole::Technician | UserRole::Manager)
    }
}

/// Report upsert payload, conflict target `id`
#[derive(Debug, Clone, Serialize)]
pub struct ReportUpsert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub report_type: ReportType,
    pub project_id: Option<String>,
    pub status: ReportStatus,
    #[serde(rename = "assigned_to")]
    pub assignee_id: Option<String>,
    pub assigned_at: Option<String>,
    pub closed_at: Option<String>,
    pub closing_notes: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Creator reference. Included only until the first successful push so
    /// a later device can never silently reassign ownership.
    #[serde(rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<String>,
}

impl ReportUpsert {
    /// Build the push payload: every mutable field plus a regenerated
    /// `updated_at`.
    pub fn from_report(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            title: report.title.clone(),
            description: report.description.clone(),
            report_type: report.report_type,
            project_id: report.project_id.clone(),
            status: report.status,
            assignee_id: report.assignee_id.clone(),
            assigned_at: report.assigned_at.map(util::millis_to_rfc3339),
            closed_at: report.closed_at.map(util::millis_to_rfc3339),
            closing_notes: report.closing_notes.clone(),
            updated_by: report.updated_by.clone(),
            created_at: util::millis_to_rfc3339(report.created_at),
            updated_at: util::millis_to_rfc3339(util::now_millis()),
            creator_id: (!report.synced_once).then(|| report.creator_id.clone()),
        }
    }
}

/// Audit-history insert row
#[derive(Debug, Clone, Serialize)]
pub struct StatusHistoryInsert {
    pub report_id: String,
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    pub changed_by: String,
    pub changed_by_name: String,
    pub changed_at: String,
    pub comment: Option<String>,
}

impl StatusHistoryInsert {
    pub fn from_entry(report_id: &str, entry: &StatusChange) -> Self {
        Self {
            report_id: report_id.to_string(),
            old_status: entry.old_status,
            new_status: entry.new_status,
            changed_by: entry.changed_by.clone(),
            changed_by_name: entry.changed_by_name.clone(),
            changed_at: util::millis_to_rfc3339(entry.changed_at),
            comment: entry.comment.clone(),
        }
    }
}

/// Attachment upsert row, conflict target `id`
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentUpsert {
    pub id: String,
    pub report_id: String,
    #[serde(rename = "user_id")]
    pub uploader_id: String,
    pub file_url: String,
    pub file_name: String,
    pub mime_type: String,
}

/// Pulled project row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl RemoteProject {
    pub fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            updated_at: self.updated_at.as_deref().and_then(util::rfc3339_to_millis),
        }
    }
}

/// Pulled attachment row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAttachment {
    pub id: String,
    pub report_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl RemoteAttachment {
    /// Remote row is authoritative: synced, URL in place, no local binary
    pub fn into_attachment(self) -> Attachment {
        Attachment {
            id: self.id,
            report_id: self.report_id,
            uploader_id: self.user_id.unwrap_or_default(),
            file_name: self.file_name,
            mime_type: self.mime_type,
            file_url: self.file_url,
            file_data: None,
            synced: true,
            to_delete: false,
        }
    }
}

/// Pulled audit-history row (part of the report join expansion)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteHistoryRow {
    pub old_status: ReportStatus,
    pub new_status: ReportStatus,
    #[serde(default)]
    pub changed_by: Option<String>,
    #[serde(default)]
    pub changed_by_name: Option<String>,
    pub changed_at: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Joined profile fragment (`reporter` / `technician`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedProfile {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Joined project fragment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Pulled report row with join expansion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteReport {
    pub id: String,
    #[serde(default)]
    pub ticket_no: Option<String>,
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    pub status: ReportStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub assigned_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub closing_notes: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub reporter: Option<JoinedProfile>,
    #[serde(default)]
    pub technician: Option<JoinedProfile>,
    #[serde(default)]
    pub project: Option<JoinedProject>,
    /// Authoritative audit history; read for display, never written back
    /// into the local buffer
    #[serde(default)]
    pub history: Vec<RemoteHistoryRow>,
}

impl RemoteReport {
    /// Convert the authoritative row into a local record: display names
    /// denormalized, marked synced, empty history buffer.
    pub fn into_report(self) -> Report {
        let project_id = self
            .project
            .as_ref()
            .map(|p| p.id.clone())
            .or(self.project_id);
        let project_name = self.project.map(|p| p.name);

        Report {
            id: self.id,
            ticket_no: self.ticket_no,
            report_type: self.report_type,
            title: self.title,
            description: self.description,
            creator_id: self.user_id.unwrap_or_default(),
            creator_name: self.reporter.and_then(|p| p.full_name),
            assignee_id: self.assigned_to,
            assignee_name: self.technician.and_then(|p| p.full_name),
            project_id,
            project_name,
            status: self.status,
            created_at: self
                .created_at
                .as_deref()
                .and_then(util::rfc3339_to_millis)
                .unwrap_or_else(util::now_millis),
            updated_at: self.updated_at.as_deref().and_then(util::rfc3339_to_millis),
            updated_by: self.updated_by,
            assigned_at: self
                .assigned_at
                .as_deref()
                .and_then(util::rfc3339_to_millis),
            closed_at: self.closed_at.as_deref().and_then(util::rfc3339_to_millis),
            closing_notes: self.closing_notes,
            synced: true,
            synced_once: true,
            to_delete: false,
            status_changes: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(synced_once: bool) -> Report {
        Report {
            id: "r-1".into(),
            ticket_no: None,
            report_type: ReportType::Incident,
            title: "t".into(),
            description: "d".into(),
            creator_id: "u-1".into(),
            creator_name: None,
            assignee_id: None,
            assignee_name: None,
            project_id: None,
            project_name: None,
            status: ReportStatus::Submitted,
            created_at: 1_700_000_000_000,
            updated_at: None,
            updated_by: None,
            assigned_at: None,
            closed_at: None,
            closing_notes: None,
            synced: false,
            synced_once,
            to_delete: false,
            status_changes: vec![],
        }
    }

    #[test]
    fn first_push_carries_creator() {
        let payload = ReportUpsert::from_report(&report(false));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["user_id"], "u-1");
    }

    #[test]
    fn later_pushes_omit_creator() {
        let payload = ReportUpsert::from_report(&report(true));
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn pulled_row_denormalizes_names() {
        let row = RemoteReport {
            id: "r-9".into(),
            ticket_no: Some("TCK-9".into()),
            report_type: ReportType::Maintenance,
            title: "t".into(),
            description: "d".into(),
            user_id: Some("u-1".into()),
            assigned_to: Some("u-2".into()),
            project_id: None,
            status: ReportStatus::Open,
            created_at: Some("2024-01-01T00:00:00+00:00".into()),
            updated_at: None,
            assigned_at: None,
            closed_at: None,
            closing_notes: None,
            updated_by: None,
            reporter: Some(JoinedProfile {
                full_name: Some("Ana Reporter".into()),
            }),
            technician: Some(JoinedProfile {
                full_name: Some("Tom Tech".into()),
            }),
            project: Some(JoinedProject {
                id: "p-1".into(),
                name: "North Site".into(),
                updated_at: None,
            }),
            history: vec![],
        };

        let report = row.into_report();
        assert_eq!(report.creator_name.as_deref(), Some("Ana Reporter"));
        assert_eq!(report.assignee_name.as_deref(), Some("Tom Tech"));
        assert_eq!(report.project_id.as_deref(), Some("p-1"));
        assert_eq!(report.project_name.as_deref(), Some("North Site"));
        assert!(report.synced);
        assert!(report.synced_once);
        assert!(report.status_changes.is_empty());
    }
}
