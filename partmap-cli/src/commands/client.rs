//! Thin HTTP client for the partmap server API.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::debug;

/// JSON-over-HTTP client bound to one server base URL.
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base: server.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base, path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed (is the server running?)"))?;
        Self::into_json(response).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}{}", self.base, path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed (is the server running?)"))?;
        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("Server returned a non-JSON response")?;

        if !status.is_success() {
            let message = body["error"].as_str().unwrap_or("unknown error");
            bail!("Server error ({status}): {message}");
        }

        Ok(body)
    }
}
