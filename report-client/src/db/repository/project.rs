//! Project lookup repository (pulled, never pushed)

use super::{RepoResult, record_key};
use shared::models::Project;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "project";
const SELECT: &str = "SELECT *, record::id(id) AS id FROM project";

#[derive(Clone)]
pub struct ProjectRepository {
    db: Surreal<Db>,
}

impl ProjectRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub async fn get(&self, id: &str) -> RepoResult<Option<Project>> {
        let mut result = self
            .db
            .query(format!("{SELECT} WHERE id = $id"))
            .bind(("id", record_key(TABLE, id)))
            .await?;
        let projects: Vec<Project> = result.take(0)?;
        Ok(projects.into_iter().next())
    }

    pub async fn put(&self, project: &Project) -> RepoResult<()> {
        self.db
            .query("UPSERT $thing CONTENT $data RETURN NONE")
            .bind(("thing", record_key(TABLE, &project.id)))
            .bind(("data", project.clone()))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn all(&self) -> RepoResult<Vec<Project>> {
        let mut result = self.db.query(format!("{SELECT} ORDER BY name")).await?;
        Ok(result.take(0)?)
    }
}
