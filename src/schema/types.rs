//! Form schema model
//!
//! The backend describes every connector form as a map of field
//! descriptors. Only the members the dashboard reads are typed; anything
//! else the backend sends is kept in `extra` and written back untouched.

use super::rules::{derive_rules, SchemaRules};
use crate::i18n::Translator;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Field name -> descriptor, in backend order
pub type Components = IndexMap<String, FieldDescriptor>;

/// Descriptor of a single form field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Allowed values for enum fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<Value>>,
    /// Nested fields of an object field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Components>,
    /// Element descriptor of an array field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldDescriptor>>,
    /// Rendering format hint (`sql`, `file`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "componentProps",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub component_props: Option<ComponentProps>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDescriptor {
    /// Create a descriptor of the given type
    pub fn of_type(field_type: &str) -> Self {
        Self {
            field_type: Some(field_type.to_string()),
            ..Default::default()
        }
    }

    /// Builder: set the element descriptor
    pub fn with_items(mut self, items: FieldDescriptor) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    /// Builder: set nested properties
    pub fn with_properties(mut self, properties: Components) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Builder: set enum symbols
    pub fn with_symbols<S: Into<Value>>(mut self, symbols: impl IntoIterator<Item = S>) -> Self {
        self.symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: mark as required
    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn is_type(&self, field_type: &str) -> bool {
        self.field_type.as_deref() == Some(field_type)
    }

    /// `array` whose items are `string`
    pub fn is_string_array(&self) -> bool {
        self.is_type("array")
            && self
                .items
                .as_deref()
                .is_some_and(|items| items.is_type("string"))
    }

    pub fn is_string_or_string_array(&self) -> bool {
        self.is_type("string") || self.is_string_array()
    }
}

/// Rendering hints handed to the form widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearable: Option<bool>,
    /// Input variant, e.g. `textarea`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    /// Accepted file extensions for upload fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `{components, rules}` pair a schema form is rendered from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaPair {
    pub components: Components,
    pub rules: SchemaRules,
}

impl SchemaPair {
    pub fn new(components: Components, rules: SchemaRules) -> Self {
        Self { components, rules }
    }

    /// Pair the components with the rules implied by their `required` flags
    pub fn from_components(components: Components, translator: &dyn Translator) -> Self {
        let rules = derive_rules(&components, translator);
        Self { components, rules }
    }
}

/// Parse components from JSON or YAML text
///
/// YAML is a superset of JSON, but JSON is tried first so its error
/// messages are reported for `.json` input.
pub fn parse_components(content: &str) -> Result<Components> {
    match serde_json::from_str(content) {
        Ok(components) => Ok(components),
        Err(json_err) => serde_yaml::from_str(content).with_context(|| {
            format!("Schema is neither valid JSON ({}) nor valid YAML", json_err)
        }),
    }
}

/// Load components from a JSON or YAML file
pub fn load_components(path: &Path) -> Result<Components> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {}", path.display()))?;
    parse_components(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_keeps_unknown_members() {
        let raw = json!({
            "type": "string",
            "format": "password",
            "is_template": true,
            "componentProps": { "showPassword": true }
        });
        let descriptor: FieldDescriptor = serde_json::from_value(raw.clone()).unwrap();
        assert!(descriptor.is_type("string"));
        assert_eq!(descriptor.extra["is_template"], json!(true));
        assert_eq!(serde_json::to_value(&descriptor).unwrap(), raw);
    }

    #[test]
    fn test_string_array_detection() {
        let servers = FieldDescriptor::of_type("array").with_items(FieldDescriptor::of_type("string"));
        assert!(servers.is_string_array());
        assert!(servers.is_string_or_string_array());

        let numbers = FieldDescriptor::of_type("array").with_items(FieldDescriptor::of_type("number"));
        assert!(!numbers.is_string_or_string_array());
        assert!(!FieldDescriptor::of_type("array").is_string_array());
    }

    #[test]
    fn test_parse_components_from_yaml() {
        let yaml = "
name:
  type: string
  required: true
resource_opts:
  type: object
  properties:
    batch_time:
      type: duration
";
        let components = parse_components(yaml).unwrap();
        assert_eq!(components.len(), 2);
        let nested = components["resource_opts"].properties.as_ref().unwrap();
        assert!(nested["batch_time"].is_type("duration"));
    }

    #[test]
    fn test_parse_components_rejects_garbage() {
        assert!(parse_components("[1, 2").is_err());
    }
}
