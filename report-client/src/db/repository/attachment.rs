//! Attachment repository

use super::{RepoResult, record_key};
use shared::models::Attachment;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "attachment";
const SELECT: &str = "SELECT *, record::id(id) AS id FROM attachment";

#[derive(Clone)]
pub struct AttachmentRepository {
    db: Surreal<Db>,
}

impl AttachmentRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: &str) -> RepoResult<Option<Attachment>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE id = $id"))
            .bind(("id", record_key(TABLE, id)))
            .await?;
        let attachments: Vec<Attachment> = result.take(0)?;
        Ok(attachments.into_iter().next())
    }

    pub async fn put(&self, attachment: &Attachment) -> RepoResult<()> {
        self.db
            .query("UPSERT $thing CONTENT $data RETURN NONE")
            .bind(("thing", record_key(TABLE, &attachment.id)))
            .bind(("data", attachment.clone()))
            .await?
            .check()?;
        Ok(())
    }

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

    /// All attachments of a report
    pub async fn for_report(&self, report_id: &str) -> RepoResult<Vec<Attachment>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE report_id = $report_id"))
            .bind(("report_id", report_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Attachments of a report still awaiting upload (not tombstoned)
    pub async fn unsynced_for_report(&self, report_id: &str) -> RepoResult<Vec<Attachment>> {
        let mut result = self
            .db
            .query(format!(
                "{SELECT} WHERE report_id = $report_id AND synced = false AND to_delete = false"
            ))
            .bind(("report_id", report_id.to_string()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Attachments tombstoned for deletion
    pub async fn flagged_for_delete(&self) -> RepoResult<Vec<Attachment>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE to_delete = true"))
            .await?;
        Ok(result.take(0)?)
    }
}
