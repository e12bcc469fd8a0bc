//! Pre-submit data handlers
//!
//! Resources read from the backend carry runtime state that the write
//! endpoints reject. Handlers strip it before a body is sent back.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Runtime members the backend adds to read responses
const RUNTIME_KEYS: &[&str] = &[
    "status",
    "status_reason",
    "node_status",
    "metrics",
    "node_metrics",
    "created_at",
    "last_modified_at",
];

/// TLS file members that must not be sent while TLS is off
const SSL_FILE_KEYS: &[&str] = &["cacertfile", "certfile", "keyfile", "password"];

/// Shapes a request body before it is submitted
#[async_trait]
pub trait DataHandler: Send + Sync {
    async fn prepare(&self, body: Map<String, Value>) -> Result<Map<String, Value>>;
}

/// Handler for bridge create/update bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeDataHandler;

#[async_trait]
impl DataHandler for BridgeDataHandler {
    async fn prepare(&self, mut body: Map<String, Value>) -> Result<Map<String, Value>> {
        for key in RUNTIME_KEYS {
            body.remove(*key);
        }

        if let Some(ssl) = body.get_mut("ssl").and_then(Value::as_object_mut) {
            let enabled = ssl.get("enable").and_then(Value::as_bool).unwrap_or(false);
            if !enabled {
                for key in SSL_FILE_KEYS {
                    ssl.remove(*key);
                }
            }
        }

        Ok(body)
    }
}

/// Handler for action update bodies.
///
/// An action's type and name are fixed by its identifier, so the update
/// endpoint rejects them in the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionDataHandler;

#[async_trait]
impl DataHandler for ActionDataHandler {
    async fn prepare(&self, body: Map<String, Value>) -> Result<Map<String, Value>> {
        let mut body = BridgeDataHandler.prepare(body).await?;
        body.remove("type");
        body.remove("name");
        Ok(body)
    }
}
