//! Report actions

use serde_json::{Map, json};
use shared::models::{Attachment, NewAttachment, NewReport, Report, ReportEdit, ReportStatus};
use shared::{AppError, AppResult, util};
use uuid::Uuid;

use super::{Transition, mutate_report, require_session};
use crate::core::ClientState;

/// Create a report locally (status `Submitted`), with optional attachments.
///
/// No remote write happens here — the triggered engine pushes it. Creation
/// records no audit entry; the first transition appears on assignment.
pub async fn create_report(
    state: &ClientState,
    input: NewReport,
    files: Vec<NewAttachment>,
) -> AppResult<Report> {
    let session = require_session(state).await?;

    if input.title.trim().is_empty() {
        return Err(AppError::validation("title is required"));
    }
    if input.description.trim().is_empty() {
        return Err(AppError::validation("description is required"));
    }

    let report = Report {
        id: Uuid::new_v4().to_string(),
        ticket_no: None,
        report_type: input.report_type,
        title: input.title,
        description: input.description,
        creator_id: session.user_id.clone(),
        creator_name: None,
        assignee_id: None,
        assignee_name: None,
        project_id: input.project_id,
        project_name: None,
        status: ReportStatus::Submitted,
        created_at: util::now_millis(),
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
    state.reports().put(&report).await?;

    for file in files {
        let attachment = Attachment {
            id: Uuid::new_v4().to_string(),
            report_id: report.id.clone(),
            uploader_id: session.user_id.clone(),
            file_name: file.file_name,
            mime_type: file.mime_type,
            file_url: None,
            file_data: Some(file.data),
            synced: false,
            to_delete: false,
        };
        state.attachments().put(&attachment).await?;
    }

    state.scheduler().trigger();
    Ok(report)
}

/// Edit report fields (title, description, type, project)
pub async fn update_report(
    state: &ClientState,
    report_id: &str,
    edit: ReportEdit,
) -> AppResult<Report> {
    let mut fields = Map::new();
    if let Some(title) = edit.title {
        if title.trim().is_empty() {
            return Err(AppError::validation("title cannot be empty"));
        }
        fields.insert("title".into(), json!(title));
    }
    if let Some(description) = edit.description {
        fields.insert("description".into(), json!(description));
    }
    if let Some(report_type) = edit.report_type {
        fields.insert("report_type".into(), json!(report_type));
    }
    if let Some(project_id) = edit.project_id {
        fields.insert("project_id".into(), json!(project_id));
    }

    mutate_report(state, report_id, fields, None).await
}

/// Assign the report to a technician; transitions to `New`
pub async fn assign_report(
    state: &ClientState,
    report_id: &str,
    technician_id: &str,
) -> AppResult<Report> {
    let mut fields = Map::new();
    fields.insert("assigned_to".into(), json!(technician_id));
    fields.insert("assigned_at".into(), json!(util::now_millis()));

    mutate_report(
        state,
        report_id,
        fields,
        Some(Transition {
            new_status: ReportStatus::New,
            comment: None,
        }),
    )
    .await
}

/// Move the report between the assignee's working statuses
pub async fn change_status(
    state: &ClientState,
    report_id: &str,
    new_status: ReportStatus,
) -> AppResult<Report> {
    if !matches!(
        new_status,
        ReportStatus::Open | ReportStatus::Pending | ReportStatus::Resolved
    ) {
        return Err(AppError::validation(
            "status must be Open, Pending or Resolved",
        ));
    }

    let report = state
        .reports()
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Report {report_id} not found")))?;
    if report.status == new_status {
        return Err(AppError::validation("report is already in this status"));
    }

    mutate_report(
        state,
        report_id,
        Map::new(),
        Some(Transition {
            new_status,
            comment: None,
        }),
    )
    .await
}

/// Close the report with a mandatory closing note
pub async fn close_report(state: &ClientState, report_id: &str, note: &str) -> AppResult<Report> {
    if note.trim().is_empty() {
        return Err(AppError::validation("closing notes are required"));
    }

    let mut fields = Map::new();
    fields.insert("closing_notes".into(), json!(note));
    fields.insert("closed_at".into(), json!(util::now_millis()));

    mutate_report(
        state,
        report_id,
        fields,
        Some(Transition {
            new_status: ReportStatus::Closed,
            comment: Some(note.to_string()),
        }),
    )
    .await
}

/// Delete a report.
///
/// A record that never completed a push has no remote counterpart and is
/// purged locally right away, together with its attachments. Anything else
/// is tombstoned for the engine's delete phase.
pub async fn delete_report(state: &ClientState, report_id: &str) -> AppResult<()> {
    let report = state
        .reports()
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Report {report_id} not found")))?;

    if !report.synced_once {
        for attachment in state.attachments().for_report(report_id).await? {
            state.attachments().delete(&attachment.id).await?;
        }
        state.reports().delete(report_id).await?;
        return Ok(());
    }

    state
        .reports()
        .merge(report_id, json!({ "to_delete": true, "synced": false }))
        .await?;
    state.scheduler().trigger();
    Ok(())
}
