//! Sync scheduler
//!
//! Owns the single-flight guard: at most one pass in flight, concurrent
//! triggers are dropped rather than queued. The connectivity monitor
//! triggers a pass on startup (when already connected) and on every
//! offline→online transition; the mutation recorder calls [`trigger`]
//! after every local write.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::remote::RemoteBackend;
use crate::sync::engine::SyncEngine;

pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    remote: Arc<dyn RemoteBackend>,
    running: Arc<AtomicBool>,
    check_interval: Duration,
}

/// Releases the single-flight lock when the pass ends, even if it panics
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SyncScheduler {
    pub fn new(
        engine: Arc<SyncEngine>,
        remote: Arc<dyn RemoteBackend>,
        check_interval: Duration,
    ) -> Self {
        Self {
            engine,
            remote,
            running: Arc::new(AtomicBool::new(false)),
            check_interval,
        }
    }

    /// Fire-and-forget sync trigger. A no-op while a pass is in flight.
    pub fn trigger(&self) {
        let Some(guard) = self.try_begin() else {
            tracing::debug!("sync already running, trigger dropped");
            return;
        };

        let engine = self.engine.clone();
        tokio::spawn(async move {
            let _guard = guard;
            engine.run().await;
        });
    }

    /// Run a pass on the current task. Returns false if one was already in
    /// flight and this call was dropped.
    pub async fn run_once(&self) -> bool {
        let Some(guard) = self.try_begin() else {
            tracing::debug!("sync already running, trigger dropped");
            return false;
        };

        let _guard = guard;
        self.engine.run().await;
        true
    }

    fn try_begin(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard(self.running.clone()))
    }

    /// Monitor connectivity until shutdown.
    ///
    /// Probes the remote service on an interval; a pass is triggered when
    /// the process starts already connected and on every offline→online
    /// transition. A trigger arriving mid-pass is absorbed — the next
    /// natural trigger or post-mutation call picks the work up.
    pub async fn watch_connectivity(self: Arc<Self>, shutdown: CancellationToken) {
        let mut online = self.remote.check_connectivity().await;
        if online {
            tracing::info!("started online, triggering initial sync");
            self.trigger();
        }

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let now_online = self.remote.check_connectivity().await;
                    if now_online && !online {
                        tracing::info!("connectivity regained, triggering sync");
                        self.trigger();
                    } else if !now_online && online {
                        tracing::warn!("connectivity lost");
                    }
                    online = now_online;
                }
            }
        }

        tracing::info!("connectivity monitor stopped");
    }
}
