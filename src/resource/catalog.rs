//! Connector Catalog - which connector types are native actions
//!
//! The dashboard backend serves two resource families. Connector types
//! listed here are managed through the actions API; everything else is
//! treated as a bridge.

use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Embedded catalog file (compiled into the binary)
const CONNECTORS_FILE: &str = include_str!("../resources/connectors.json");

/// Answers whether a connector type is served by the actions API.
///
/// The dispatcher asks on every call, so implementations may change
/// their answer over time.
pub trait ConnectorCatalog: Send + Sync {
    fn is_supported(&self, connector_type: &str) -> bool;
}

impl<F> ConnectorCatalog for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_supported(&self, connector_type: &str) -> bool {
        self(connector_type)
    }
}

/// Root structure of resources/connectors.json
#[derive(Debug, Clone, Deserialize)]
struct ConnectorsFile {
    #[serde(default)]
    action_types: Vec<String>,
}

/// Action connector types shipped with the crate
pub fn embedded_action_types() -> &'static [String] {
    static TYPES: OnceLock<Vec<String>> = OnceLock::new();
    TYPES.get_or_init(|| match serde_json::from_str::<ConnectorsFile>(CONNECTORS_FILE) {
        Ok(file) => file.action_types,
        Err(e) => {
            tracing::error!("Failed to parse embedded connector catalog: {}", e);
            Vec::new()
        },
    })
}

/// A fixed set of action connector types
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: HashSet<String>,
}

impl StaticCatalog {
    /// Catalog from the embedded connector list
    pub fn embedded() -> Self {
        Self::from_types(embedded_action_types().iter().cloned())
    }

    pub fn from_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ConnectorCatalog for StaticCatalog {
    fn is_supported(&self, connector_type: &str) -> bool {
        self.types.contains(connector_type)
    }
}
