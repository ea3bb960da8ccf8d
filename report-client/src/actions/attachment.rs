//! Attachment actions

use serde_json::json;
use shared::models::{Attachment, NewAttachment};
use shared::{AppError, AppResult};
use uuid::Uuid;

use super::require_session;
use crate::core::ClientState;

/// Record a new attachment for an existing report. The binary stays local
/// until the engine uploads it.
pub async fn add_attachment(
    state: &ClientState,
    report_id: &str,
    file: NewAttachment,
) -> AppResult<Attachment> {
    let session = require_session(state).await?;

    if state.reports().get(report_id).await?.is_none() {
        return Err(AppError::not_found(format!("Report {report_id} not found")));
    }

    let attachment = Attachment {
        id: Uuid::new_v4().to_string(),
        report_id: report_id.to_string(),
        uploader_id: session.user_id,
        file_name: file.file_name,
        mime_type: file.mime_type,
        file_url: None,
        file_data: Some(file.data),
        synced: false,
        to_delete: false,
    };
    state.attachments().put(&attachment).await?;

    // The push phase walks unsynced reports; re-flag the owner so the new
    // attachment is picked up even when the report itself was clean.
    state
        .reports()
        .merge(report_id, json!({ "synced": false }))
        .await?;

    state.scheduler().trigger();
    Ok(attachment)
}

/// Remove an attachment.
///
/// Never uploaded (no URL, unsynced) — purge locally. Otherwise tombstone
/// it for the engine's delete phase.
pub async fn remove_attachment(state: &ClientState, attachment_id: &str) -> AppResult<()> {
    let attachment = state
        .attachments()
        .get(attachment_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Attachment {attachment_id} not found")))?;

    if !attachment.synced && attachment.file_url.is_none() {
        state.attachments().delete(attachment_id).await?;
        return Ok(());
    }

    state
        .attachments()
        .merge(attachment_id, json!({ "to_delete": true, "synced": false }))
        .await?;
    state.scheduler().trigger();
    Ok(())
}
