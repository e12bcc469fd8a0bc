//! Dashboard API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Dashboard client implementing [`RuleEngineApi`]
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use rulebridge::api::{client::DashboardClient, RuleEngineApi};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = DashboardClient::new("http://127.0.0.1:18083/api/v5", None, DEFAULT_TIMEOUT)?;
//!     let action = client.get_action("mysql:orders").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

use crate::resource::ResourcePayload;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use client::{DashboardClient, DEFAULT_TIMEOUT};
pub use http::{format_api_error, ApiError, Credentials};

/// Endpoints of the two resource families.
///
/// Errors are returned as the transport produced them.
#[async_trait]
pub trait RuleEngineApi: Send + Sync {
    async fn get_action(&self, id: &str) -> Result<ResourcePayload>;
    async fn create_action(&self, payload: &ResourcePayload) -> Result<ResourcePayload>;
    async fn update_action(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload>;
    async fn delete_action(&self, id: &str) -> Result<()>;
    async fn set_action_enabled(&self, id: &str, enable: bool) -> Result<()>;
    async fn action_metrics(&self, id: &str) -> Result<Value>;

    async fn get_bridge(&self, id: &str) -> Result<ResourcePayload>;
    async fn create_bridge(&self, payload: &ResourcePayload) -> Result<ResourcePayload>;
    async fn update_bridge(&self, id: &str, body: &Map<String, Value>) -> Result<ResourcePayload>;
    async fn delete_bridge(&self, id: &str) -> Result<()>;
    /// Start (`true`) or stop (`false`) a bridge
    async fn start_stop_bridge(&self, id: &str, enable: bool) -> Result<()>;
    async fn bridge_metrics(&self, id: &str) -> Result<Value>;
}
