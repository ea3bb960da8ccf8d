//! Shared test fixtures: in-memory store, scripted remote backend, event
//! capture helpers.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use report_client::db::DbService;
use report_client::remote::{
    AttachmentUpsert, RemoteAttachment, RemoteBackend, RemoteError, RemoteProject, RemoteReport,
    RemoteResult, ReportUpsert, Session, StatusHistoryInsert, UserRole,
};
use report_client::sync::{SyncEngine, SyncStatus};
use report_client::{ClientState, Config};
use shared::models::{Attachment, Report, ReportStatus, ReportType};

pub const TEST_USER: &str = "user-1";

/// Scripted remote backend.
///
/// Write calls are logged and stored the way the real service keeps rows
/// (merge on conflict target `id`), so pulls reflect pushed state. Failure
/// injection: per-report upsert failures and a global write-failure switch
/// simulating lost connectivity.
#[derive(Default)]
pub struct MockRemote {
    pub session: Mutex<Option<Session>>,
    /// When set, `current_session` blocks until notified (single-flight tests)
    pub session_gate: Mutex<Option<Arc<Notify>>>,
    pub online: AtomicBool,
    pub fail_all_writes: AtomicBool,
    pub fail_report_upserts_for: Mutex<HashSet<String>>,

    pub projects: Mutex<Vec<RemoteProject>>,
    /// report id → merged row, as the server would keep it
    pub report_rows: Mutex<HashMap<String, serde_json::Value>>,
    pub report_upsert_log: Mutex<Vec<serde_json::Value>>,
    pub history_rows: Mutex<Vec<StatusHistoryInsert>>,
    pub attachment_rows: Mutex<HashMap<String, AttachmentUpsert>>,
    pub objects: Mutex<HashMap<String, (Vec<u8>, String)>>,

    pub deleted_reports: Mutex<Vec<String>>,
    pub deleted_attachments: Mutex<Vec<String>>,
    pub deleted_objects: Mutex<Vec<String>>,
}

impl MockRemote {
    pub fn logged_in() -> Self {
        let mock = Self::default();
        *mock.session.lock().unwrap() = Some(Session {
            user_id: TEST_USER.into(),
            email: Some("user@example.com".into()),
            full_name: Some("Field User".into()),
            role: UserRole::Reporter,
        });
        mock.online.store(true, Ordering::SeqCst);
        mock
    }

    pub fn elevate(&self, role: UserRole) {
        if let Some(session) = self.session.lock().unwrap().as_mut() {
            session.role = role;
        }
    }

    pub fn fail_upserts_for(&self, report_id: &str) {
        self.fail_report_upserts_for
            .lock()
            .unwrap()
            .insert(report_id.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_report_upserts_for.lock().unwrap().clear();
        self.fail_all_writes.store(false, Ordering::SeqCst);
    }

    /// Seed a remote attachment row, as if a previous client uploaded it
    pub fn seed_attachment_row(&self, id: &str, report_id: &str, file_url: &str) {
        self.attachment_rows.lock().unwrap().insert(
            id.to_string(),
            AttachmentUpsert {
                id: id.to_string(),
                report_id: report_id.to_string(),
                uploader_id: TEST_USER.into(),
                file_url: file_url.to_string(),
                file_name: "seeded.jpg".into(),
                mime_type: "image/jpeg".into(),
            },
        );
    }

    /// Seed a raw remote report row (bypassing the upsert path)
    pub fn seed_report_row(&self, row: serde_json::Value) {
        let id = row["id"].as_str().expect("seeded row needs an id").to_string();
        self.report_rows.lock().unwrap().insert(id, row);
    }

    fn write_guard(&self) -> RemoteResult<()> {
        if self.fail_all_writes.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("simulated connectivity loss".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteBackend for MockRemote {
    async fn current_session(&self) -> RemoteResult<Option<Session>> {
        let gate = self.session_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn check_connectivity(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    async fn fetch_projects(&self) -> RemoteResult<Vec<RemoteProject>> {
        Ok(self.projects.lock().unwrap().clone())
    }

    async fn upsert_report(&self, payload: ReportUpsert) -> RemoteResult<()> {
        self.write_guard()?;
        if self
            .fail_report_upserts_for
            .lock()
            .unwrap()
            .contains(&payload.id)
        {
            return Err(RemoteError::Network("simulated upsert failure".into()));
        }

        let value = serde_json::to_value(&payload).expect("payload serializes");
        self.report_upsert_log.lock().unwrap().push(value.clone());

        let mut rows = self.report_rows.lock().unwrap();
        match rows.get_mut(&payload.id) {
            // merge-duplicates: absent payload fields keep their stored value
            Some(existing) => {
                if let (Some(existing), Some(incoming)) =
                    (existing.as_object_mut(), value.as_object())
                {
                    for (k, v) in incoming {
                        existing.insert(k.clone(), v.clone());
                    }
                }
            }
            None => {
                rows.insert(payload.id.clone(), value);
            }
        }
        Ok(())
    }

    async fn delete_report(&self, id: &str) -> RemoteResult<()> {
        self.write_guard()?;
        self.report_rows.lock().unwrap().remove(id);
        self.deleted_reports.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn insert_status_history(&self, row: StatusHistoryInsert) -> RemoteResult<()> {
        self.write_guard()?;
        self.history_rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn fetch_reports(&self, user_id: &str, elevated: bool) -> RemoteResult<Vec<RemoteReport>> {
        let history = self.history_rows.lock().unwrap();
        let rows = self.report_rows.lock().unwrap();

        let mut out = Vec::new();
        for (id, row) in rows.iter() {
            if !elevated {
                let owner = row.get("user_id").and_then(|v| v.as_str());
                if owner != Some(user_id) {
                    continue;
                }
            }

            let mut row = row.clone();
            let report_history: Vec<serde_json::Value> = history
                .iter()
                .filter(|h| h.report_id == *id)
                .map(|h| serde_json::to_value(h).expect("history row serializes"))
                .collect();
            row["history"] = serde_json::Value::Array(report_history);

            let report: RemoteReport =
                serde_json::from_value(row).map_err(|e| RemoteError::Decode(e.to_string()))?;
            out.push(report);
        }
        Ok(out)
    }

    async fn fetch_attachments(&self, report_id: &str) -> RemoteResult<Vec<RemoteAttachment>> {
        let rows = self.attachment_rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|a| a.report_id == report_id)
            .map(|a| RemoteAttachment {
                id: a.id.clone(),
                report_id: a.report_id.clone(),
                user_id: Some(a.uploader_id.clone()),
                file_name: a.file_name.clone(),
                file_url: Some(a.file_url.clone()),
                mime_type: Some(a.mime_type.clone()),
            })
            .collect())
    }

    async fn upsert_attachment(&self, payload: AttachmentUpsert) -> RemoteResult<()> {
        self.write_guard()?;
        self.attachment_rows
            .lock()
            .unwrap()
            .insert(payload.id.clone(), payload);
        Ok(())
    }

    async fn delete_attachment(&self, id: &str) -> RemoteResult<()> {
        self.write_guard()?;
        self.attachment_rows.lock().unwrap().remove(id);
        self.deleted_attachments.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn upload_object(&self, path: &str, bytes: Vec<u8>, mime: &str) -> RemoteResult<()> {
        self.write_guard()?;
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (bytes, mime.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "http://mock{}{}",
            report_client::remote::PUBLIC_OBJECT_PREFIX,
            path
        )
    }

    async fn delete_object(&self, path: &str) -> RemoteResult<()> {
        self.write_guard()?;
        self.objects.lock().unwrap().remove(path);
        self.deleted_objects.lock().unwrap().push(path.to_string());
        Ok(())
    }
}

/// Fresh client state over an in-memory store and a logged-in mock remote
pub async fn state_with_mock() -> (ClientState, Arc<MockRemote>) {
    let db = DbService::open_in_memory().await.expect("in-memory store").db;
    let remote = Arc::new(MockRemote::logged_in());
    let config = Config::with_overrides("/tmp/report-client-test", "http://mock");
    let state = ClientState::with_parts(config, db, remote.clone());
    (state, remote)
}

/// Deterministic engine over the same store/remote/events as `state`
pub fn engine_for(state: &ClientState, remote: &Arc<MockRemote>) -> SyncEngine {
    SyncEngine::new(state.db.clone(), remote.clone(), state.events.clone())
}

/// Record every emitted status for assertions
pub fn capture_statuses(state: &ClientState) -> Arc<Mutex<Vec<SyncStatus>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    state.events.on_status(move |status| {
        sink.lock().unwrap().push(status);
    });
    log
}

pub fn sample_report(id: &str) -> Report {
    Report {
        id: id.into(),
        ticket_no: None,
        report_type: ReportType::Incident,
        title: format!("Report {id}"),
        description: "Something broke".into(),
        creator_id: TEST_USER.into(),
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
        synced_once: false,
        to_delete: false,
        status_changes: vec![],
    }
}

pub fn sample_attachment(id: &str, report_id: &str, file_name: &str) -> Attachment {
    Attachment {
        id: id.into(),
        report_id: report_id.into(),
        uploader_id: TEST_USER.into(),
        file_name: file_name.into(),
        mime_type: None,
        file_url: None,
        file_data: Some(vec![0xFF, 0xD8, 0xFF, 0xE0]),
        synced: false,
        to_delete: false,
    }
}
