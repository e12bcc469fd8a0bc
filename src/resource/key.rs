//! Resource identifiers
//!
//! Actions and bridges are addressed as `{type}:{name}`, e.g.
//! `redis:cache_writer`.

use std::fmt;

/// The two halves of a resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub connector_type: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(connector_type: &str, name: &str) -> Self {
        Self {
            connector_type: connector_type.to_string(),
            name: name.to_string(),
        }
    }

    /// Split an identifier at its first `:`.
    ///
    /// Never fails: an identifier without `:` is all type and no name.
    pub fn parse(id: &str) -> Self {
        match id.split_once(':') {
            Some((connector_type, name)) => Self::new(connector_type, name),
            None => Self::new(id, ""),
        }
    }

    /// Type segment of an identifier without allocating a key
    pub fn type_of(id: &str) -> &str {
        id.split_once(':').map_or(id, |(connector_type, _)| connector_type)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.connector_type, self.name)
    }
}
