//! WebDAV storage implementation.
//!
//! The whole snapshot lives in one JSON resource: GET to read, PUT to
//! replace. A 404 means the target has never been written.

use super::SnapshotStore;
use crate::codec::{decode_snapshot, encode_snapshot};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use mindwtr_types::Snapshot;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

fn default_timeout_secs() -> u64 {
    60
}

/// WebDAV target configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDavConfig {
    /// Full URL of the snapshot resource.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl WebDavConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Sets Basic auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty()) && self.password.is_some()
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for WebDavConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A snapshot stored as a single WebDAV resource.
pub struct WebDavStore {
    config: WebDavConfig,
    client: Client,
}

impl WebDavStore {
    /// Creates a WebDAV store.
    pub fn new(config: WebDavConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Returns the resource URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let credentials = self.config.has_credentials();
        let mut request = self.client.request(method, &self.config.url);

        for (name, value) in &self.config.headers {
            // Configured credentials replace any hand-written Authorization header.
            if credentials && name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }

        if credentials {
            if let Some(username) = &self.config.username {
                request = request.basic_auth(username, self.config.password.as_ref());
            }
        }
        request
    }

    fn has_header(&self, name: &str) -> bool {
        self.config
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Builds the error for a non-success response.
fn status_error(operation: &str, status: StatusCode, body: &str) -> SyncError {
    let detail = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or_default()
    } else {
        body
    };
    let message = format!("WebDAV {operation} failed ({}): {detail}", status.as_u16());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(message),
        _ => SyncError::Network(message),
    }
}

#[async_trait]
impl SnapshotStore for WebDavStore {
    fn describe(&self) -> String {
        format!("WebDAV {}", self.config.url)
    }

    async fn read(&self) -> SyncResult<Option<Snapshot>> {
        debug!("WebDAV GET {}", self.config.url);

        let response = self
            .request(Method::GET)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("WebDAV GET failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No snapshot at {}", self.config.url);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("GET", status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("failed to read WebDAV response: {e}")))?;
        decode_snapshot(&bytes).map(Some)
    }

    async fn write(&self, snapshot: &Snapshot) -> SyncResult<()> {
        let body = encode_snapshot(snapshot, true)?;
        debug!("WebDAV PUT {} ({} bytes)", self.config.url, body.len());

        let mut request = self.request(Method::PUT);
        if !self.has_header(CONTENT_TYPE.as_str()) {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("WebDAV PUT failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("PUT", status, &body));
        }

        info!("Uploaded snapshot to {}", self.config.url);
        Ok(())
    }
}
