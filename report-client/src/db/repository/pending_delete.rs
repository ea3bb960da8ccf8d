//! Pending-delete markers
//!
//! Identity-only records reserved for deletions that must survive even if
//! the owning record is purged first. The live deletion paths tombstone
//! records in place via `to_delete`; this collection is the schema-level
//! safety net kept for that extension.

use serde::{Deserialize, Serialize};

use super::{RepoResult, record_key};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "pending_delete";

/// Identity-only deletion marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDelete {
    #[serde(skip_serializing)]
    pub id: String,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct PendingDeleteRepository {
    db: Surreal<Db>,
}

impl PendingDeleteRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub async fn mark(&self, id: &str) -> RepoResult<()> {
        let marker = PendingDelete {
            id: id.to_string(),
            created_at: shared::util::now_millis(),
        };
        self.db
            .query("UPSERT $thing CONTENT $data RETURN NONE")
            .bind(("thing", record_key(TABLE, id)))
            .bind(("data", marker))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn clear(&self, id: &str) -> RepoResult<()> {
        self.db
            .query("DELETE $thing RETURN NONE")
            .bind(("thing", record_key(TABLE, id)))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn all(&self) -> RepoResult<Vec<PendingDelete>> {
        let mut result = self
            .db
            .query("SELECT *, record::id(id) AS id FROM pending_delete")
            .await?;
        Ok(result.take(0)?)
    }
}
