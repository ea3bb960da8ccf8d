//! Sync engine
//!
//! One operation: run a reconciliation pass. Phases execute in a fixed
//! order — deletions before pushes so a tombstoned remote record is never
//! resurrected, the authoritative pull last so it reflects the just-pushed
//! state:
//!
//! 1. Session check (no identity → `login_required`, stop)
//! 2. Project reference pull
//! 3. Flagged attachment deletion
//! 4. Flagged report deletion (cascading)
//! 5. Unsynced report push (history flush + attachment upload)
//! 6. Authoritative full pull
//!
//! Each phase is fault-isolated: a per-item failure is logged and skipped,
//! leaving the item unsynced for the next pass. The pass is idempotent and
//! resumable — a crash mid-pass leaves the store in a state a later run
//! completes correctly.

use std::sync::Arc;

use shared::AppError;
use shared::models::{Attachment, Report};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::repository::{AttachmentRepository, ProjectRepository, ReportRepository};
use crate::remote::{AttachmentUpsert, RemoteBackend, ReportUpsert, Session, StatusHistoryInsert};
use crate::sync::events::{SyncEvents, SyncStatus};

const FALLBACK_MIME: &str = "application/octet-stream";

enum PassOutcome {
    Completed,
    LoginRequired,
}

pub struct SyncEngine {
    reports: ReportRepository,
    attachments: AttachmentRepository,
    projects: ProjectRepository,
    remote: Arc<dyn RemoteBackend>,
    events: Arc<SyncEvents>,
}

impl SyncEngine {
    pub fn new(db: Surreal<Db>, remote: Arc<dyn RemoteBackend>, events: Arc<SyncEvents>) -> Self {
        Self {
            reports: ReportRepository::new(db.clone()),
            attachments: AttachmentRepository::new(db.clone()),
            projects: ProjectRepository::new(db),
            remote,
            events,
        }
    }

    /// Run one sync pass. Safe to call repeatedly; concurrency is bounded
    /// by the scheduler's single-flight guard.
    pub async fn run(&self) {
        self.events.emit_status(SyncStatus::Syncing);
        tracing::info!("sync pass starting");

        match self.run_inner().await {
            Ok(PassOutcome::Completed) => {
                tracing::info!("sync pass complete");
                self.events.emit_status(SyncStatus::Done);
            }
            Ok(PassOutcome::LoginRequired) => {
                tracing::warn!("sync pass stopped: no authenticated session");
                self.events.emit_status(SyncStatus::LoginRequired);
            }
            Err(e) => {
                tracing::error!("sync pass failed: {e}");
                self.events.emit_status(SyncStatus::Error);
            }
        }
    }

    async fn run_inner(&self) -> Result<PassOutcome, AppError> {
        let session = match self.remote.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(PassOutcome::LoginRequired),
            Err(e) => return Err(e.into()),
        };

        self.pull_projects().await;
        self.delete_flagged_attachments().await;
        self.delete_flagged_reports().await;
        self.push_unsynced_reports(&session).await;
        self.pull_reports(&session).await?;

        Ok(PassOutcome::Completed)
    }

    /// Phase 2: overwrite the local project lookup table. Pull-only, no
    /// conflict possible.
    async fn pull_projects(&self) {
        let rows = match self.remote.fetch_projects().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!("project pull failed: {e}");
                return;
            }
        };

        for row in rows {
            let project = row.into_project();
            if let Err(e) = self.projects.put(&project).await {
                tracing::warn!(project_id = %project.id, "failed to store project: {e}");
            }
        }
    }

    /// Phase 3: flagged attachments — remote row, remote object, then the
    /// local record. Per-item failures leave the tombstone for retry.
    async fn delete_flagged_attachments(&self) {
        let flagged = match self.attachments.flagged_for_delete().await {
            Ok(flagged) => flagged,
            Err(e) => {
                tracing::warn!("failed to scan attachments flagged for delete: {e}");
                return;
            }
        };

        for attachment in flagged {
            if let Err(e) = self.delete_one_attachment(&attachment).await {
                tracing::warn!(attachment_id = %attachment.id, "attachment delete failed: {e}");
            }
        }
    }

    async fn delete_one_attachment(&self, attachment: &Attachment) -> Result<(), AppError> {
        self.remote.delete_attachment(&attachment.id).await?;

        if let Some(url) = &attachment.file_url
            && let Some(path) = self.remote.storage_path_from_url(url)
        {
            self.remote.delete_object(&path).await?;
        }

        self.attachments.delete(&attachment.id).await?;
        tracing::debug!(attachment_id = %attachment.id, "attachment deleted");
        Ok(())
    }

    /// Phase 4: flagged reports — remote report row, every remote
    /// attachment (object + row), local attachments, local report.
    async fn delete_flagged_reports(&self) {
        let flagged = match self.reports.flagged_for_delete().await {
            Ok(flagged) => flagged,
            Err(e) => {
                tracing::warn!("failed to scan reports flagged for delete: {e}");
                return;
            }
        };

        if !flagged.is_empty() {
            tracing::info!(count = flagged.len(), "deleting flagged reports");
        }

        for report in flagged {
            if let Err(e) = self.delete_one_report(&report).await {
                tracing::warn!(report_id = %report.id, "report delete failed: {e}");
            }
        }
    }

    async fn delete_one_report(&self, report: &Report) -> Result<(), AppError> {
        self.remote.delete_report(&report.id).await?;

        // Cascade: every remote attachment loses its object and its row
        let remote_attachments = self.remote.fetch_attachments(&report.id).await?;
        for attachment in remote_attachments {
            if let Some(url) = &attachment.file_url
                && let Some(path) = self.remote.storage_path_from_url(url)
            {
                self.remote.delete_object(&path).await?;
            }
            self.remote.delete_attachment(&attachment.id).await?;
        }

        for attachment in self.attachments.for_report(&report.id).await? {
            self.attachments.delete(&attachment.id).await?;
        }

        self.reports.delete(&report.id).await?;
        tracing::debug!(report_id = %report.id, "report deleted");
        Ok(())
    }

    /// Phase 5: push every locally-changed report, then its buffered
    /// history, then its pending attachments. A failed upsert aborts only
    /// that report's remaining sub-steps.
    async fn push_unsynced_reports(&self, session: &Session) {
        let unsynced = match self.reports.unsynced().await {
            Ok(unsynced) => unsynced,
            Err(e) => {
                tracing::warn!("failed to scan unsynced reports: {e}");
                return;
            }
        };

        if !unsynced.is_empty() {
            tracing::info!(count = unsynced.len(), "pushing unsynced reports");
        }

        for report in unsynced {
            if let Err(e) = self.push_one_report(&report, session).await {
                tracing::warn!(report_id = %report.id, "report push failed: {e}");
            }
        }
    }

    async fn push_one_report(&self, report: &Report, session: &Session) -> Result<(), AppError> {
        self.remote
            .upsert_report(ReportUpsert::from_report(report))
            .await?;

        // Buffered history entries go up as independent best-effort
        // inserts; a failed insert never rolls back the report upsert.
        for entry in &report.status_changes {
            if let Err(e) = self
                .remote
                .insert_status_history(StatusHistoryInsert::from_entry(&report.id, entry))
                .await
            {
                tracing::warn!(report_id = %report.id, "history push failed: {e}");
            }
        }

        self.reports
            .merge(
                &report.id,
                serde_json::json!({
                    "synced": true,
                    "synced_once": true,
                    "status_changes": [],
                }),
            )
            .await?;

        match self.attachments.unsynced_for_report(&report.id).await {
            Ok(pending) => {
                for attachment in pending {
                    if let Err(e) = self.push_one_attachment(report, &attachment, session).await {
                        tracing::warn!(
                            attachment_id = %attachment.id,
                            "attachment upload failed: {e}"
                        );
                    }
                }
            }
            Err(e) => {
                tracing::warn!(report_id = %report.id, "failed to scan pending attachments: {e}");
            }
        }

        self.events.emit_report_synced(sync_label(report));
        Ok(())
    }

    async fn push_one_attachment(
        &self,
        report: &Report,
        attachment: &Attachment,
        session: &Session,
    ) -> Result<(), AppError> {
        let Some(data) = attachment.file_data.clone() else {
            tracing::warn!(attachment_id = %attachment.id, "attachment has no local payload");
            return Ok(());
        };

        let mime = resolve_mime(attachment);
        let path = format!(
            "{}/{}.{}",
            report.id,
            attachment.id,
            file_extension(&attachment.file_name)
        );

        self.remote.upload_object(&path, data, &mime).await?;
        let url = self.remote.public_url(&path);

        self.remote
            .upsert_attachment(AttachmentUpsert {
                id: attachment.id.clone(),
                report_id: report.id.clone(),
                uploader_id: session.user_id.clone(),
                file_url: url.clone(),
                file_name: attachment.file_name.clone(),
                mime_type: mime.clone(),
            })
            .await?;

        // The local binary is no longer needed once the URL is in place
        self.attachments
            .merge(
                &attachment.id,
                serde_json::json!({
                    "synced": true,
                    "file_url": url,
                    "mime_type": mime,
                    "file_data": null,
                }),
            )
            .await?;

        tracing::debug!(attachment_id = %attachment.id, "attachment uploaded");
        Ok(())
    }

    /// Phase 6: pull the authoritative snapshot. Local records that still
    /// hold unpushed changes (unsynced flag, buffered history, tombstone)
    /// are left alone — the next pass pushes them first.
    async fn pull_reports(&self, session: &Session) -> Result<(), AppError> {
        let rows = self
            .remote
            .fetch_reports(&session.user_id, session.role.is_elevated())
            .await
            .map_err(AppError::from)?;

        tracing::debug!(count = rows.len(), "pulled reports");

        for row in rows {
            // Mirror the joined project while we have it
            if let Some(joined) = &row.project {
                let project = crate::remote::RemoteProject {
                    id: joined.id.clone(),
                    name: joined.name.clone(),
                    updated_at: joined.updated_at.clone(),
                }
                .into_project();
                if let Err(e) = self.projects.put(&project).await {
                    tracing::warn!(project_id = %project.id, "failed to store project: {e}");
                }
            }

            let report_id = row.id.clone();
            if let Some(local) = self.reports.get(&report_id).await? {
                let has_local_changes =
                    !local.synced || local.to_delete || !local.status_changes.is_empty();
                if has_local_changes {
                    tracing::debug!(
                        report_id = %report_id,
                        "pull skipped: local record has unpushed changes"
                    );
                    continue;
                }
            }

            self.reports.put(&row.into_report()).await?;
            self.pull_report_attachments(&report_id).await?;
        }

        Ok(())
    }

    async fn pull_report_attachments(&self, report_id: &str) -> Result<(), AppError> {
        let rows = self.remote.fetch_attachments(report_id).await?;
        for row in rows {
            if let Some(local) = self.attachments.get(&row.id).await?
                && (local.to_delete || !local.synced)
            {
                continue;
            }
            self.attachments.put(&row.into_attachment()).await?;
        }
        Ok(())
    }
}

/// Label for the per-report-synced notice: title, else description, else id
fn sync_label(report: &Report) -> &str {
    if !report.title.is_empty() {
        &report.title
    } else if !report.description.is_empty() {
        &report.description
    } else {
        &report.id
    }
}

/// Resolve an attachment's MIME type: explicit metadata, then the file
/// extension lookup, then the generic binary fallback.
fn resolve_mime(attachment: &Attachment) -> String {
    if let Some(mime) = &attachment.mime_type
        && !mime.is_empty()
    {
        return mime.clone();
    }
    mime_guess::from_path(&attachment.file_name)
        .first_raw()
        .unwrap_or(FALLBACK_MIME)
        .to_string()
}

fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}
