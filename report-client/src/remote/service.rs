//! RemoteService — HTTP client for the remote row/object/auth service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use shared::AppError;
use tokio::sync::RwLock;

use crate::core::Config;
use crate::remote::types::{
    AttachmentUpsert, RemoteAttachment, RemoteProject, RemoteReport, ReportUpsert, Session,
    StatusHistoryInsert, UserRole,
};
use crate::remote::{PUBLIC_OBJECT_PREFIX, RemoteBackend, RemoteError, RemoteResult};

/// Join expansion for the report pull: creator name, assignee name, project
/// reference, and the ordered audit-history list.
const REPORT_SELECT: &str = "*,reporter:user_id(full_name),technician:assigned_to(full_name),\
project:project_id(id,name,updated_at),\
history:report_status_history(old_status,new_status,changed_at,comment,changed_by,changed_by_name)";

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
}

/// HTTP client for the remote service.
///
/// The access token is installed by the (external) login layer via
/// [`RemoteBackend::set_access_token`]; the last authenticated identity is
/// cached so recorder actions keep working offline.
pub struct RemoteService {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
    cached_session: RwLock<Option<Session>>,
}

impl RemoteService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| AppError::remote(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key: config.backend_api_key.clone(),
            access_token: RwLock::new(None),
            cached_session: RwLock::new(None),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/attachments/{}", self.base_url, path)
    }

    async fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, url)
            .header("apikey", &self.api_key);
        if let Some(token) = self.access_token.read().await.as_deref() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn check(response: reqwest::Response) -> RemoteResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn fetch_profile(&self, user_id: &str) -> RemoteResult<ProfileRow> {
        let url = format!(
            "{}?select=full_name,role&id=eq.{}",
            self.rest_url("user_profiles"),
            user_id
        );
        let response = self.request(Method::GET, url).await.send().await?;
        let rows: Vec<ProfileRow> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }
}

#[async_trait]
impl RemoteBackend for RemoteService {
    async fn set_access_token(&self, token: Option<String>) {
        if token.is_none() {
            *self.cached_session.write().await = None;
        }
        *self.access_token.write().await = token;
    }

    async fn current_session(&self) -> RemoteResult<Option<Session>> {
        let token = self.access_token.read().await.clone();
        let Some(token) = token else {
            return Ok(None);
        };

        let attempt = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&token)
            .send()
            .await;

        match attempt {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                *self.cached_session.write().await = None;
                Ok(None)
            }
            Ok(response) => {
                let user: AuthUser = Self::check(response)
                    .await?
                    .json()
                    .await
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;

                // Role and display name live in the profile table; losing
                // them degrades display only, not identity.
                let profile = self.fetch_profile(&user.id).await.unwrap_or_default();
                let session = Session {
                    user_id: user.id,
                    email: user.email,
                    full_name: profile.full_name,
                    role: profile.role.unwrap_or_default(),
                };
                *self.cached_session.write().await = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                // Offline: fall back to the last authenticated identity so
                // local mutations can still be recorded.
                if let Some(cached) = self.cached_session.read().await.clone() {
                    return Ok(Some(cached));
                }
                Err(e.into())
            }
        }
    }

    async fn check_connectivity(&self) -> bool {
        self.client
            .get(format!("{}/auth/v1/health", self.base_url))
            .header("apikey", &self.api_key)
            .send()
            .await
            .is_ok()
    }

    async fn fetch_projects(&self) -> RemoteResult<Vec<RemoteProject>> {
        let url = format!(
            "{}?select=id,name,updated_at&order=name.asc",
            self.rest_url("projects")
        );
        let response = self.request(Method::GET, url).await.send().await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn upsert_report(&self, payload: ReportUpsert) -> RemoteResult<()> {
        let url = format!("{}?on_conflict=id", self.rest_url("reports"));
        let response = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&payload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_report(&self, id: &str) -> RemoteResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url("reports"), id);
        let response = self.request(Method::DELETE, url).await.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn insert_status_history(&self, row: StatusHistoryInsert) -> RemoteResult<()> {
        let url = self.rest_url("report_status_history");
        let response = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn fetch_reports(&self, user_id: &str, elevated: bool) -> RemoteResult<Vec<RemoteReport>> {
        let mut url = format!("{}?select={}", self.rest_url("reports"), REPORT_SELECT);
        if !elevated {
            url.push_str(&format!("&user_id=eq.{user_id}"));
        }
        let response = self.request(Method::GET, url).await.send().await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn fetch_attachments(&self, report_id: &str) -> RemoteResult<Vec<RemoteAttachment>> {
        let url = format!(
            "{}?select=*&report_id=eq.{}",
            self.rest_url("attachments"),
            report_id
        );
        let response = self.request(Method::GET, url).await.send().await?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn upsert_attachment(&self, payload: AttachmentUpsert) -> RemoteResult<()> {
        let url = format!("{}?on_conflict=id", self.rest_url("attachments"));
        let response = self
            .request(Method::POST, url)
            .await
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&payload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_attachment(&self, id: &str) -> RemoteResult<()> {
        let url = format!("{}?id=eq.{}", self.rest_url("attachments"), id);
        let response = self.request(Method::DELETE, url).await.send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn upload_object(&self, path: &str, bytes: Vec<u8>, mime: &str) -> RemoteResult<()> {
        let response = self
            .request(Method::POST, self.storage_url(path))
            .await
            .header(reqwest::header::CONTENT_TYPE, mime)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, PUBLIC_OBJECT_PREFIX, path)
    }

    async fn delete_object(&self, path: &str) -> RemoteResult<()> {
        let response = self
            .request(Method::DELETE, self.storage_url(path))
            .await
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
