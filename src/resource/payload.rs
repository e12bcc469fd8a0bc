//! Resource payloads and family classification

use super::catalog::ConnectorCatalog;
use super::key::ResourceKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An action or bridge as the backend returns and accepts it.
///
/// Only `id` and `type` are interpreted; all other members travel in
/// `fields` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePayload {
    /// Server-assigned `{type}:{name}` identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub connector_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ResourcePayload {
    pub fn new(connector_type: &str) -> Self {
        Self {
            id: None,
            connector_type: connector_type.to_string(),
            fields: Map::new(),
        }
    }

    /// Builder: set a field
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    /// Split off the identifier, leaving a body that can never carry one
    pub fn into_body(self) -> (Option<String>, Map<String, Value>) {
        let mut body: Map<String, Value> = self
            .fields
            .into_iter()
            .filter(|(key, _)| key != "id")
            .collect();
        body.insert("type".to_string(), Value::String(self.connector_type));
        (self.id, body)
    }
}

/// Which backend endpoint group serves a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceFamily {
    /// Native rule-engine action (`/actions`)
    Action,
    /// Connector to an external system (`/bridges`)
    Bridge,
}

impl ResourceFamily {
    /// Classify a connector type; anything the catalog does not list is a bridge
    pub fn of_type(connector_type: &str, catalog: &dyn ConnectorCatalog) -> Self {
        if catalog.is_supported(connector_type) {
            ResourceFamily::Action
        } else {
            ResourceFamily::Bridge
        }
    }

    /// Classify by the type segment of a `{type}:{name}` identifier
    pub fn of_id(id: &str, catalog: &dyn ConnectorCatalog) -> Self {
        Self::of_type(ResourceKey::type_of(id), catalog)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceFamily::Action => "action",
            ResourceFamily::Bridge => "bridge",
        }
    }
}

impl fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::StaticCatalog;
    use serde_json::json;

    #[test]
    fn test_payload_keeps_unknown_fields() {
        let raw = json!({
            "id": "redis:cache",
            "type": "redis",
            "name": "cache",
            "parameters": { "command_template": ["RPUSH", "k", "${payload}"] }
        });
        let payload: ResourcePayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(payload.id.as_deref(), Some("redis:cache"));
        assert_eq!(payload.connector_type, "redis");
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn test_into_body_drops_id() {
        let payload = ResourcePayload::new("mysql")
            .with_id("mysql:orders")
            .with_field("enable", json!(true));
        let (id, body) = payload.into_body();
        assert_eq!(id.as_deref(), Some("mysql:orders"));
        assert!(!body.contains_key("id"));
        assert_eq!(body["type"], json!("mysql"));
        assert_eq!(body["enable"], json!(true));
    }

    #[test]
    fn test_into_body_ignores_stray_identity_fields() {
        let payload = ResourcePayload::new("mysql")
            .with_field("id", json!("mysql:other"))
            .with_field("type", json!("http"));
        let (id, body) = payload.into_body();
        assert!(id.is_none());
        assert!(!body.contains_key("id"));
        assert_eq!(body["type"], json!("mysql"));
    }

    #[test]
    fn test_family_classification() {
        let catalog = StaticCatalog::from_types(["mysql", "http"]);
        assert_eq!(ResourceFamily::of_id("mysql:orders", &catalog), ResourceFamily::Action);
        assert_eq!(ResourceFamily::of_id("webhook:hook", &catalog), ResourceFamily::Bridge);
        assert_eq!(ResourceFamily::of_id("no-colon", &catalog), ResourceFamily::Bridge);
        assert_eq!(ResourceFamily::of_type("http", &catalog), ResourceFamily::Action);
        assert_eq!(ResourceFamily::Bridge.to_string(), "bridge");
    }
}
