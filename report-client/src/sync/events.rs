//! Sync event bus
//!
//! One optional listener per event category; registering replaces the
//! previous listener, firing with none registered is a silent no-op. The
//! bus is injected wherever it is needed — no module-level globals — so
//! tests get fresh instances.

use std::sync::Mutex;

/// Sync pass lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Syncing,
    Done,
    Error,
    LoginRequired,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SyncStatus::Syncing => "syncing",
            SyncStatus::Done => "done",
            SyncStatus::Error => "error",
            SyncStatus::LoginRequired => "login_required",
        };
        f.write_str(s)
    }
}

type StatusListener = Box<dyn Fn(SyncStatus) + Send + Sync>;
type ReportSyncedListener = Box<dyn Fn(&str) + Send + Sync>;

/// Process-wide sync notification point
#[derive(Default)]
pub struct SyncEvents {
    status: Mutex<Option<StatusListener>>,
    report_synced: Mutex<Option<ReportSyncedListener>>,
}

impl SyncEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the status listener, replacing any previous one
    pub fn on_status(&self, listener: impl Fn(SyncStatus) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.status.lock() {
            *slot = Some(Box::new(listener));
        }
    }

    /// Register the per-report-synced listener, replacing any previous one
    pub fn on_report_synced(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.report_synced.lock() {
            *slot = Some(Box::new(listener));
        }
    }

    /// Unbind both listeners
    pub fn clear(&self) {
        if let Ok(mut slot) = self.status.lock() {
            *slot = None;
        }
        if let Ok(mut slot) = self.report_synced.lock() {
            *slot = None;
        }
    }

    pub fn emit_status(&self, status: SyncStatus) {
        if let Ok(slot) = self.status.lock()
            && let Some(listener) = slot.as_ref()
        {
            listener(status);
        }
    }

    pub fn emit_report_synced(&self, label: &str) {
        if let Ok(slot) = self.report_synced.lock()
            && let Some(listener) = slot.as_ref()
        {
            listener(label);
        }
    }
}
