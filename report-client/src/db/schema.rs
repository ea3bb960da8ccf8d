//! Local schema definition and versioned migrations
//!
//! Four collections: `report`, `attachment`, `project`, `pending_delete`.
//! Migrations are additive only — a new field gains a backfilled default on
//! existing records, so a client with queued unsynced data can always
//! upgrade in place. The applied version lives in `schema_meta:version`.

use serde::Deserialize;
use shared::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Current schema version
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Deserialize)]
struct VersionRow {
    version: u32,
}

/// Apply the schema and any pending additive migrations.
///
/// Safe to run on every open; each step is idempotent.
pub async fn apply(db: &Surreal<Db>) -> Result<(), AppError> {
    define_tables(db).await?;

    let current = current_version(db).await?;
    if current >= SCHEMA_VERSION {
        return Ok(());
    }

    if current < 2 {
        migrate_v2(db).await?;
    }

    db.query("UPSERT schema_meta:version SET version = $version")
        .bind(("version", SCHEMA_VERSION))
        .await
        .map_err(|e| AppError::store(format!("Failed to record schema version: {e}")))?
        .check()
        .map_err(|e| AppError::store(format!("Failed to record schema version: {e}")))?;

    tracing::info!(from = current, to = SCHEMA_VERSION, "local schema migrated");
    Ok(())
}

async fn define_tables(db: &Surreal<Db>) -> Result<(), AppError> {
    // v1 baseline: the four collections. SCHEMALESS — records carry their
    // own fields; defaults for later additions are backfilled by the
    // migration steps below.
    db.query(
        "DEFINE TABLE IF NOT EXISTS report SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS attachment SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS project SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS pending_delete SCHEMALESS;
         DEFINE TABLE IF NOT EXISTS schema_meta SCHEMALESS;",
    )
    .await
    .map_err(|e| AppError::store(format!("Failed to define tables: {e}")))?
    .check()
    .map_err(|e| AppError::store(format!("Failed to define tables: {e}")))?;
    Ok(())
}

async fn current_version(db: &Surreal<Db>) -> Result<u32, AppError> {
    let mut result = db
        .query("SELECT version FROM schema_meta")
        .await
        .map_err(|e| AppError::store(format!("Failed to read schema version: {e}")))?;
    let rows: Vec<VersionRow> = result
        .take(0)
        .map_err(|e| AppError::store(format!("Failed to read schema version: {e}")))?;
    Ok(rows.first().map(|r| r.version).unwrap_or(0))
}

/// v2: sync-metadata additions on reports and attachments.
///
/// Records written before these fields existed gain their defaults:
/// `synced_once = false`, `to_delete = false`, an empty history buffer.
async fn migrate_v2(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "UPDATE report SET synced_once = false WHERE synced_once = NONE;
         UPDATE report SET to_delete = false WHERE to_delete = NONE;
         UPDATE report SET status_changes = [] WHERE status_changes = NONE;
         UPDATE attachment SET to_delete = false WHERE to_delete = NONE;",
    )
    .await
    .map_err(|e| AppError::store(format!("Migration v2 failed: {e}")))?
    .check()
    .map_err(|e| AppError::store(format!("Migration v2 failed: {e}")))?;
    Ok(())
}
