//! Mutation recorder
//!
//! Every user action that changes report state follows the same two-step
//! contract, factored into [`mutate_report`]:
//!
//! 1. Local write — field delta plus a buffered audit entry, marked
//!    `synced = false`. Always succeeds offline; the only step the caller
//!    waits on.
//! 2. Optimistic fast path — if a session exists, attempt the equivalent
//!    remote write immediately. On success mark the record synced and
//!    clear the pushed buffer; on any failure leave it unsynced for the
//!    engine to retry.
//!
//! Either way the scheduler is triggered afterwards, never blocking the
//! caller on the outcome.

pub mod attachment;
pub mod report;

pub use attachment::{add_attachment, remove_attachment};
pub use report::{
    assign_report, change_status, close_report, create_report, delete_report, update_report,
};

use serde_json::json;
use shared::models::{Report, ReportStatus, StatusChange};
use shared::{AppError, AppResult, util};

use crate::core::ClientState;
use crate::remote::{ReportUpsert, Session, StatusHistoryInsert};

/// Status transition recorded alongside a mutation
pub(crate) struct Transition {
    pub new_status: ReportStatus,
    pub comment: Option<String>,
}

pub(crate) async fn require_session(state: &ClientState) -> AppResult<Session> {
    match state.remote.current_session().await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(AppError::NotAuthenticated),
        Err(e) => Err(e.into()),
    }
}

/// Apply a field delta (and optional status transition) to a report:
/// local write first, optimistic remote write second, engine trigger last.
pub(crate) async fn mutate_report(
    state: &ClientState,
    report_id: &str,
    mut fields: serde_json::Map<String, serde_json::Value>,
    transition: Option<Transition>,
) -> AppResult<Report> {
    let session = require_session(state).await?;
    let reports = state.reports();
    let report = reports
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Report {report_id} not found")))?;

    let now = util::now_millis();

    // Step 1 — local write
    fields.insert("updated_at".into(), json!(now));
    fields.insert("updated_by".into(), json!(session.user_id));
    fields.insert("synced".into(), json!(false));

    if let Some(transition) = &transition {
        let entry = StatusChange {
            old_status: report.status,
            new_status: transition.new_status,
            changed_by: session.user_id.clone(),
            changed_by_name: session.display_name(),
            changed_at: now,
            comment: transition.comment.clone(),
        };
        let mut buffer = report.status_changes.clone();
        buffer.push(entry);
        fields.insert("status".into(), json!(transition.new_status));
        fields.insert(
            "status_changes".into(),
            serde_json::to_value(&buffer)
                .map_err(|e| AppError::internal(format!("Failed to encode history: {e}")))?,
        );
    }

    reports
        .merge(report_id, serde_json::Value::Object(fields))
        .await?;

    let updated = reports
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Report {report_id} not found")))?;

    // Step 2 — optimistic fast path
    optimistic_push(state, &updated).await;

    // Step 3 — deferred engine, fire-and-forget
    state.scheduler().trigger();

    reports
        .get(report_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Report {report_id} not found")))
}

/// Best-effort immediate push. Failures are logged and left to the engine.
async fn optimistic_push(state: &ClientState, report: &Report) {
    match state
        .remote
        .upsert_report(ReportUpsert::from_report(report))
        .await
    {
        Ok(()) => {
            let mut history_ok = true;
            for entry in &report.status_changes {
                if let Err(e) = state
                    .remote
                    .insert_status_history(StatusHistoryInsert::from_entry(&report.id, entry))
                    .await
                {
                    tracing::warn!(report_id = %report.id, "optimistic history insert failed: {e}");
                    history_ok = false;
                }
            }

            // Clear the buffer only when every entry made it up, so the
            // engine never inserts the same entry twice.
            let patch = if history_ok {
                json!({ "synced": true, "synced_once": true, "status_changes": [] })
            } else {
                json!({ "synced": true, "synced_once": true })
            };
            if let Err(e) = state.reports().merge(&report.id, patch).await {
                tracing::warn!(report_id = %report.id, "failed to mark report synced: {e}");
            }
        }
        Err(e) => {
            tracing::debug!(
                report_id = %report.id,
                "optimistic push failed, deferring to sync engine: {e}"
            );
        }
    }
}
