//! HTTP utilities for dashboard REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// API key credentials (sent as HTTP basic auth)
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"******")
            .finish()
    }
}

/// HTTP client wrapper for dashboard API calls
#[derive(Clone)]
pub struct DashboardHttpClient {
    client: Client,
}

impl DashboardHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rulebridge/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, auth: Option<&Credentials>) -> Result<Value> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url), auth).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, auth: Option<&Credentials>, body: Option<&Value>) -> Result<Value> {
        tracing::debug!("POST {}", url);
        self.send(with_body(self.client.post(url), body), auth).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, auth: Option<&Credentials>, body: Option<&Value>) -> Result<Value> {
        tracing::debug!("PUT {}", url);
        self.send(with_body(self.client.put(url), body), auth).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, auth: Option<&Credentials>) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        self.send(self.client.delete(url), auth).await
    }

    async fn send(&self, request: RequestBuilder, auth: Option<&Credentials>) -> Result<Value> {
        let request = match auth {
            Some(creds) => request.basic_auth(&creds.api_key, Some(&creds.api_secret)),
            None => request,
        };

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::new(status, &body).into());
        }

        // Handle empty response (204 on delete and enable toggles)
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }
}

fn with_body(request: RequestBuilder, body: Option<&Value>) -> RequestBuilder {
    match body {
        Some(body) => request.json(body),
        None => request,
    }
}

/// A non-success response from the dashboard API
#[derive(Debug, Clone, thiserror::Error)]
#[error("API request failed: {status}{}", .code.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default())]
pub struct ApiError {
    pub status: StatusCode,
    /// Backend error code such as `NOT_FOUND` or `BAD_REQUEST`
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |name: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            status,
            code: field("code"),
            message: field("message"),
        }
    }
}

/// Format a dashboard API error for display
pub fn format_api_error(error: &anyhow::Error) -> String {
    if let Some(api_error) = error.downcast_ref::<ApiError>() {
        return match api_error.status.as_u16() {
            400 => match &api_error.message {
                Some(message) => format!("Invalid request: {}", sanitize_for_log(message)),
                None => "Invalid request. Check your parameters.".to_string(),
            },
            401 => "Authentication failed. Check the API key and secret.".to_string(),
            403 => "Permission denied for this API key.".to_string(),
            404 => "Resource not found.".to_string(),
            409 => "Resource conflict. The resource may already exist or be in use.".to_string(),
            429 => "Rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "Dashboard service temporarily unavailable. Please try again.".to_string(),
            _ => format!("Request failed: {}", api_error.status),
        };
    }

    // Truncate long error messages and remove potential sensitive data
    let error_str = format!("{:#}", error);
    let sanitized = error_str
        .chars()
        .filter(|c| !c.is_control())
        .take(120)
        .collect::<String>();

    if sanitized.len() < error_str.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
