pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, header};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::AppError;
use crate::models::{Course, Credentials, SessionPayload};

pub use dto::{ConfigPayload, ConfigUpdate, CoursePatch, RangeUpdate};

const API: &str = "api/v1";

/// The registration-monitor backend, one method per REST call.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn session_status(&self) -> Result<SessionPayload, AppError>;
    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, AppError>;
    async fn browser_login(&self) -> Result<SessionPayload, AppError>;
    async fn fetch_config(&self) -> Result<ConfigPayload, AppError>;
    async fn post_config(&self, update: &ConfigUpdate) -> Result<ConfigPayload, AppError>;
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn post_course(&self, uid: &str, patch: &CoursePatch) -> Result<Course, AppError>;
    async fn delete_course(&self, uid: &str) -> Result<Course, AppError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid base url {}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str, query: &[(&'static str, String)]) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid endpoint {}: {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("{} failed: {} {}", what, status, body);
            return Err(AppError::Status { status: status.as_u16(), body });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", what, e);
            AppError::Decode(format!("{}: {}", what, e))
        })
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn session_status(&self) -> Result<SessionPayload, AppError> {
        let url = self.endpoint(&format!("{}/login_status", API), &[])?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response, "session status").await
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, AppError> {
        let url = self.endpoint("login", &[])?;
        let form = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id", &credentials.id)
            .append_pair("password", &credentials.password)
            .append_pair("remember", if credentials.remember { "true" } else { "false" })
            .finish();

        let response = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await?;
        Self::read_json(response, "login").await
    }

    async fn browser_login(&self) -> Result<SessionPayload, AppError> {
        let url = self.endpoint(&format!("{}/browser_login", API), &[])?;
        let response = self.client.post(url).send().await?;
        Self::read_json(response, "browser login").await
    }

    async fn fetch_config(&self) -> Result<ConfigPayload, AppError> {
        let url = self.endpoint(&format!("{}/config", API), &[])?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response, "config").await
    }

    async fn post_config(&self, update: &ConfigUpdate) -> Result<ConfigPayload, AppError> {
        let url = self.endpoint(&format!("{}/config", API), &update.query_pairs())?;
        let response = self.client.post(url).send().await?;
        Self::read_json(response, "config update").await
    }

    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let url = self.endpoint(&format!("{}/courses", API), &[])?;
        let response = self.client.get(url).send().await?;
        Self::read_json(response, "courses").await
    }

    async fn post_course(&self, uid: &str, patch: &CoursePatch) -> Result<Course, AppError> {
        let url = self.endpoint(&format!("{}/courses/{}", API, uid), &patch.query_pairs())?;
        let response = self.client.post(url).send().await?;
        Self::read_json(response, "course update").await
    }

    async fn delete_course(&self, uid: &str) -> Result<Course, AppError> {
        let url = self.endpoint(&format!("{}/courses/{}", API, uid), &[])?;
        let response = self.client.delete(url).send().await?;
        Self::read_json(response, "course delete").await
    }
}
