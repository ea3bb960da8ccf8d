use std::sync::Arc;
use std::time::Duration;

use shared::{AppError, AppResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    AttachmentRepository, PendingDeleteRepository, ProjectRepository, ReportRepository,
};
use crate::remote::{RemoteBackend, RemoteService};
use crate::sync::{SyncEngine, SyncEvents, SyncScheduler};

/// Client state — holds shared references to every service.
///
/// Cheap to clone; repositories are constructed on demand over the shared
/// database handle.
#[derive(Clone)]
pub struct ClientState {
    /// Client configuration
    pub config: Config,
    /// Embedded database (SurrealDB)
    pub db: Surreal<Db>,
    /// Remote service boundary
    pub remote: Arc<dyn RemoteBackend>,
    /// Sync lifecycle event bus
    pub events: Arc<SyncEvents>,
    scheduler: Arc<SyncScheduler>,
}

impl ClientState {
    /// Initialize the client state.
    ///
    /// Opens the embedded database under `work_dir/database/`, applies
    /// schema migrations, and wires the remote service, event bus, sync
    /// engine and scheduler.
    pub async fn initialize(config: Config) -> AppResult<Self> {
        std::fs::create_dir_all(config.database_dir())
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("reports.db");
        let db = DbService::open(&db_path).await?.db;

        let remote: Arc<dyn RemoteBackend> = Arc::new(RemoteService::new(&config)?);
        Ok(Self::with_parts(config, db, remote))
    }

    /// Wire the state from pre-built parts.
    ///
    /// Used by [`initialize`](Self::initialize) and by tests, which inject
    /// an in-memory database and a scripted remote backend.
    pub fn with_parts(config: Config, db: Surreal<Db>, remote: Arc<dyn RemoteBackend>) -> Self {
        let events = Arc::new(SyncEvents::new());
        let engine = Arc::new(SyncEngine::new(db.clone(), remote.clone(), events.clone()));
        let scheduler = Arc::new(SyncScheduler::new(
            engine,
            remote.clone(),
            Duration::from_secs(config.connectivity_check_secs),
        ));

        Self {
            config,
            db,
            remote,
            events,
            scheduler,
        }
    }

    /// Start background tasks: the connectivity monitor that triggers sync
    /// passes on startup and whenever connectivity returns.
    pub fn start_background_tasks(&self, shutdown: CancellationToken) {
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            scheduler.watch_connectivity(shutdown).await;
        });
        tracing::debug!("connectivity monitor started in background");
    }

    /// Sync scheduler (single-flight trigger point)
    pub fn scheduler(&self) -> &Arc<SyncScheduler> {
        &self.scheduler
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.db.clone())
    }

    pub fn attachments(&self) -> AttachmentRepository {
        AttachmentRepository::new(self.db.clone())
    }

    pub fn projects(&self) -> ProjectRepository {
        ProjectRepository::new(self.db.clone())
    }

    pub fn pending_deletes(&self) -> PendingDeleteRepository {
        PendingDeleteRepository::new(self.db.clone())
    }
}
