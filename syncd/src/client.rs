//! HTTP client for the task-tracking service.
//!
//! One pooled `reqwest` client with bearer-token auth, a 30s timeout on
//! plain calls and a longer per-request timeout on the events endpoint.
//! Every response body arrives inside a `data` envelope; the helpers here
//! unwrap it so callers work with plain wire types.
//!
//! The events endpoint has one quirk: an expired or absent sync token is
//! answered with HTTP 412 whose body still carries a fresh token.
//! [`TrackerClient::long_poll_events`] maps that onto an empty
//! [`EventPage`], so pollers simply adopt the new token and loop.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    CustomFieldSetting, Envelope, EventPage, EventRecord, Project, Section, Task, TaskCompact,
    UpdatePayload,
};

/// HTTP request timeout for plain calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout for the events endpoint, generous enough for the
/// service to hold the poll open.
const LONG_POLL_TIMEOUT_SECS: u64 = 90;

/// Errors that can occur while talking to the tracking service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("server error: {status} - {message}")]
    Status { status: u16, message: String },

    /// A response body did not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Client for the tracking service REST API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    token: String,
    client: Client,
}

impl TrackerClient {
    /// Creates a client for the given API base URL and access token.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the underlying client cannot be built.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }

    /// Fetches a project (for its layout).
    pub async fn find_project_by_id(&self, gid: &str) -> Result<Project, ClientError> {
        self.get(&format!("/projects/{gid}")).await
    }

    /// Lists the sections of a board-layout project.
    pub async fn find_sections_by_project(&self, gid: &str) -> Result<Vec<Section>, ClientError> {
        self.get(&format!("/projects/{gid}/sections")).await
    }

    /// Lists compact task summaries in a section.
    pub async fn find_tasks_by_section(&self, gid: &str) -> Result<Vec<TaskCompact>, ClientError> {
        self.get(&format!("/sections/{gid}/tasks")).await
    }

    /// Lists compact task summaries in a list-layout project.
    pub async fn find_tasks_by_project(&self, gid: &str) -> Result<Vec<TaskCompact>, ClientError> {
        self.get(&format!("/projects/{gid}/tasks")).await
    }

    /// Fetches a task with full detail.
    pub async fn find_task_by_id(&self, gid: &str) -> Result<Task, ClientError> {
        self.get(&format!("/tasks/{gid}")).await
    }

    /// Fetches a project's custom-field settings.
    pub async fn find_custom_field_settings_by_project(
        &self,
        gid: &str,
    ) -> Result<Vec<CustomFieldSetting>, ClientError> {
        self.get(&format!("/projects/{gid}/custom_field_settings")).await
    }

    /// Writes an update payload to a task.
    pub async fn update_task(&self, gid: &str, payload: &UpdatePayload) -> Result<(), ClientError> {
        let url = format!("{}/tasks/{gid}", self.base_url);
        debug!(url = %url, "Updating task");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "data": payload }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    /// Polls the events endpoint for a project.
    ///
    /// Passing `None` for `sync` (first call) or an expired token makes the
    /// service answer 412 with a fresh token; both cases come back as an
    /// empty page carrying the token to resume from.
    pub async fn long_poll_events(
        &self,
        resource: &str,
        sync: Option<&str>,
    ) -> Result<EventPage, ClientError> {
        let url = format!("{}/events", self.base_url);
        let mut query = vec![("resource", resource)];
        if let Some(token) = sync {
            query.push(("sync", token));
        }

        debug!(resource = %resource, has_sync = sync.is_some(), "Polling events");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .timeout(Duration::from_secs(LONG_POLL_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::PRECONDITION_FAILED {
            let page: SyncOnly = serde_json::from_str(&body)?;
            return Ok(EventPage {
                events: Vec::new(),
                sync: page.sync,
            });
        }

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let page: RawEventPage = serde_json::from_str(&body)?;
        Ok(EventPage {
            events: page.data,
            sync: page.sync,
        })
    }

    /// GET helper: bearer auth, status check, `data` envelope unwrapping.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "GET");

        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&response.text().await?)?;
        Ok(envelope.data)
    }
}

/// Successful events response body.
#[derive(Debug, Deserialize)]
struct RawEventPage {
    #[serde(default)]
    data: Vec<EventRecord>,
    sync: String,
}

/// 412 response body: no events, just the fresh token.
#[derive(Debug, Deserialize)]
struct SyncOnly {
    sync: String,
}
