//! Dashboard Client
//!
//! REST client for the rule-engine dashboard API, combining credentials,
//! URL building and the HTTP wrapper.

use super::http::{Credentials, DashboardHttpClient};
use super::RuleEngineApi;
use crate::resource::ResourcePayload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Main dashboard client
#[derive(Clone)]
pub struct DashboardClient {
    pub http: DashboardHttpClient,
    pub base_url: String,
    credentials: Option<Credentials>,
}

impl DashboardClient {
    /// Create a new client for the API rooted at `base_url`
    /// (e.g. `http://127.0.0.1:18083/api/v5`)
    pub fn new(base_url: &str, credentials: Option<Credentials>, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("Unsupported URL scheme: {}", parsed.scheme()));
        }

        Ok(Self {
            http: DashboardHttpClient::new(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn auth(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Make a GET request to the API
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.http.get(url, self.auth()).await
    }

    /// Make a POST request to the API
    pub async fn post(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        self.http.post(url, self.auth(), body).await
    }

    /// Make a PUT request to the API
    pub async fn put(&self, url: &str, body: Option<&Value>) -> Result<Value> {
        self.http.put(url, self.auth(), body).await
    }

    /// Make a DELETE request to the API
    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.http.delete(url, self.auth()).await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// Build an API URL
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Build an actions URL; `id` is percent-encoded
    pub fn action_url(&self, id: Option<&str>, suffix: &str) -> String {
        self.resource_url("actions", id, suffix)
    }

    /// Build a bridges URL; `id` is percent-encoded
    pub fn bridge_url(&self, id: Option<&str>, suffix: &str) -> String {
        self.resource_url("bridges", id, suffix)
    }

    fn resource_url(&self, collection: &str, id: Option<&str>, suffix: &str) -> String {
        let mut path = collection.to_string();
        if let Some(id) = id {
            path.push('/');
            path.push_str(&urlencoding::encode(id));
        }
        if !suffix.is_empty() {
            path.push('/');
            path.push_str(suffix);
        }
        self.api_url(&path)
    }
}

fn parse_payload(value: Value) -> Result<ResourcePayload> {
    serde_json::from_value(value).context("Unexpected resource shape in response")
}

#[async_trait]
impl RuleEngineApi for DashboardClient {
    async fn get_action(&self, id: &str) -> Result<ResourcePayload> {
        parse_payload(self.get(&self.action_url(Some(id), "")).await?)
    }

    async fn create_action(&self, payload: &ResourcePayload) -> Result<ResourcePayload> {
        let body = serde_json::to_value(payload)?;
        parse_payload(self.post(&self.action_url(None, ""), Some(&body)).await?)
    }

    async fn update_action(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload> {
        let body = Value::Object(body.clone());
        parse_payload(self.put(&self.action_url(Some(id), ""), Some(&body)).await?)
    }

    async fn delete_action(&self, id: &str) -> Result<()> {
        self.delete(&self.action_url(Some(id), "")).await?;
        Ok(())
    }

    async fn set_action_enabled(&self, id: &str, enable: bool) -> Result<()> {
        let url = self.action_url(Some(id), &format!("enable/{}", enable));
        self.put(&url, None).await?;
        Ok(())
    }

    async fn action_metrics(&self, id: &str) -> Result<Value> {
        self.get(&self.action_url(Some(id), "metrics")).await
    }

    async fn get_bridge(&self, id: &str) -> Result<ResourcePayload> {
        parse_payload(self.get(&self.bridge_url(Some(id), "")).await?)
    }

    async fn create_bridge(&self, payload: &ResourcePayload) -> Result<ResourcePayload> {
        let body = serde_json::to_value(payload)?;
        parse_payload(self.post(&self.bridge_url(None, ""), Some(&body)).await?)
    }

    async fn update_bridge(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload> {
        let body = Value::Object(body.clone());
        parse_payload(self.put(&self.bridge_url(Some(id), ""), Some(&body)).await?)
    }

    async fn delete_bridge(&self, id: &str) -> Result<()> {
        self.delete(&self.bridge_url(Some(id), "")).await?;
        Ok(())
    }

    async fn start_stop_bridge(&self, id: &str, enable: bool) -> Result<()> {
        let url = self.bridge_url(Some(id), &format!("enable/{}", enable));
        self.put(&url, None).await?;
        Ok(())
    }

    async fn bridge_metrics(&self, id: &str) -> Result<Value> {
        self.get(&self.bridge_url(Some(id), "metrics")).await
    }
}
