//! Embedded database
//!
//! Owns the SurrealDB handle and applies schema migrations at open time.
//! RocksDB-backed in production, in-memory for tests.

pub mod repository;
pub mod schema;

use std::path::Path;

use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "field";
const DATABASE: &str = "reports";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database and apply migrations
    pub async fn open(db_path: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::store(format!("Failed to open database: {e}")))?;
        Self::finish_open(db).await
    }

    /// Open a fresh in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::store(format!("Failed to open in-memory database: {e}")))?;
        Self::finish_open(db).await
    }

    async fn finish_open(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::store(format!("Failed to select database: {e}")))?;

        schema::apply(&db).await?;
        tracing::info!("local store opened, schema version {}", schema::SCHEMA_VERSION);

        Ok(Self { db })
    }
}
