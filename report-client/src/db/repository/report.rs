//! Report repository

use super::{RepoResult, record_key};
use shared::models::Report;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "report";
/// Read projection: restore the record key into the model's string id
const SELECT: &str = "SELECT *, record::id(id) AS id FROM report";

#[derive(Clone)]
pub struct ReportRepository {
    db: Surreal<Db>,
}

impl ReportRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: &str) -> RepoResult<Option<Report>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE id = $id"))
            .bind(("id", record_key(TABLE, id)))
            .await?;
        let reports: Vec<Report> = result.take(0)?;
        Ok(reports.into_iter().next())
    }

    /// Insert-or-replace by id
    pub async fn put(&self, report: &Report) -> RepoResult<()> {
        self.db
            .query("UPSERT $thing CONTENT $data RETURN NONE")
            .bind(("thing", record_key(TABLE, &report.id)))
            .bind(("data", report.clone()))
            .await?
            .check()?;
        Ok(())
    }

    /// Merge the given fields into the record. Atomic per record; a partial
    /// update is never observed half-applied.
    pub async fn merge(&self, id: &str, patch: serde_json::Value) -> RepoResult<()> {
        self.db
            .query("UPDATE $thing MERGE $patch RETURN NONE")
            .bind(("thing", record_key(TABLE, id)))
            .bind(("patch", patch))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        self.db
            .query("DELETE $thing RETURN NONE")
            .bind(("thing", record_key(TABLE, id)))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn all(&self) -> RepoResult<Vec<Report>> {
        let mut result = self
            .db
            .query(format!("{SELECT} ORDER BY created_at"))
            .await?;
        Ok(result.take(0)?)
    }

    /// Reports with local changes awaiting push. Tombstoned records are
    /// excluded — they belong to the delete phase, never to an upsert.
    pub async fn unsynced(&self) -> RepoResult<Vec<Report>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT} WHERE synced = false AND to_delete = false ORDER BY created_at"
            ))
            .await?;
        Ok(result.take(0)?)
    }

    /// Reports tombstoned for deletion
    pub async fn flagged_for_delete(&self) -> RepoResult<Vec<Report>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE to_delete = true"))
            .await?;
        Ok(result.take(0)?)
    }
}
