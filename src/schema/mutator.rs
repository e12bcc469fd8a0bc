//! Schema Mutator
//!
//! The backend emits one generic form schema per connector. Some
//! connectors need UI-only corrections before the form is usable; those
//! live in a closed registry keyed by [`BridgeType`]. Corrections every
//! connector needs are applied by the base pass.

use super::common_rules::{common_id_rules, password_rules};
use super::connectors;
use super::rules::append_rules;
use super::types::SchemaPair;
use crate::i18n::Translator;
use std::fmt;
use std::sync::Arc;

/// Fields the backend declares but the dashboard never lets users edit
const UNSUPPORTED_RESOURCE_OPTS: &[&str] = &["start_after_created", "batch_time"];

/// A schema transformation step
pub type Specialization = fn(&SchemaMutator, SchemaPair) -> SchemaPair;

/// Connector types with a registered specialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeType {
    Redis,
    Gcp,
    MongoDb,
    DynamoDb,
    RocketMq,
}

impl BridgeType {
    pub const ALL: [BridgeType; 5] = [
        BridgeType::Redis,
        BridgeType::Gcp,
        BridgeType::MongoDb,
        BridgeType::DynamoDb,
        BridgeType::RocketMq,
    ];

    /// Look up a connector type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// Type tag used by the backend
    pub fn tag(self) -> &'static str {
        match self {
            BridgeType::Redis => "redis",
            BridgeType::Gcp => "gcp_pubsub",
            BridgeType::MongoDb => "mongodb",
            BridgeType::DynamoDb => "dynamo",
            BridgeType::RocketMq => "rocketmq",
        }
    }

    fn specialization(self) -> Specialization {
        match self {
            BridgeType::Redis => connectors::redis,
            BridgeType::Gcp => connectors::gcp,
            BridgeType::MongoDb => connectors::mongodb,
            BridgeType::DynamoDb | BridgeType::RocketMq => connectors::sql_template,
        }
    }
}

impl fmt::Display for BridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Applies the base pass and per-connector specializations to a schema
#[derive(Clone)]
pub struct SchemaMutator {
    translator: Arc<dyn Translator>,
}

impl SchemaMutator {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &dyn Translator {
        self.translator.as_ref()
    }

    /// Pick the transformation for a connector type; unregistered types
    /// get the base pass alone.
    pub fn handler_for(&self, connector_type: &str) -> Specialization {
        match BridgeType::from_tag(connector_type) {
            Some(bridge_type) => bridge_type.specialization(),
            None => SchemaMutator::base_pass,
        }
    }

    /// Produce the schema to render for `connector_type`
    pub fn mutate(&self, connector_type: &str, pair: SchemaPair) -> SchemaPair {
        tracing::debug!("mutate schema: type={}", connector_type);
        let handler = self.handler_for(connector_type);
        handler(self, pair)
    }

    /// Corrections applied to every connector form. Idempotent.
    pub fn base_pass(&self, pair: SchemaPair) -> SchemaPair {
        let SchemaPair {
            mut components,
            mut rules,
        } = pair;

        if let Some(opts) = components
            .get_mut("resource_opts")
            .and_then(|d| d.properties.as_mut())
        {
            for key in UNSUPPORTED_RESOURCE_OPTS {
                opts.shift_remove(*key);
            }
        }

        let translator = self.translator();
        append_rules(&mut rules, "password", password_rules(translator));
        append_rules(&mut rules, "name", common_id_rules(translator));

        SchemaPair { components, rules }
    }
}

impl Default for SchemaMutator {
    fn default() -> Self {
        Self::new(Arc::new(crate::i18n::Catalog::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::rules::{FieldRule, RuleTag, SchemaRules};
    use crate::schema::types::{Components, FieldDescriptor};

    fn sample_pair() -> SchemaPair {
        let mut opts = Components::new();
        opts.insert("start_after_created".into(), FieldDescriptor::of_type("boolean"));
        opts.insert("batch_time".into(), FieldDescriptor::of_type("duration"));
        opts.insert("worker_pool_size".into(), FieldDescriptor::of_type("number"));

        let mut components = Components::new();
        components.insert("name".into(), FieldDescriptor::of_type("string"));
        components.insert("password".into(), FieldDescriptor::of_type("string"));
        components.insert(
            "resource_opts".into(),
            FieldDescriptor::of_type("object").with_properties(opts),
        );
        SchemaPair::new(components, SchemaRules::new())
    }

    #[test]
    fn test_base_pass_drops_unsupported_resource_opts() {
        let pair = SchemaMutator::default().base_pass(sample_pair());
        let opts = pair.components["resource_opts"].properties.as_ref().unwrap();
        assert_eq!(opts.keys().collect::<Vec<_>>(), vec!["worker_pool_size"]);
    }

    #[test]
    fn test_base_pass_appends_password_and_name_rules() {
        let pair = SchemaMutator::default().base_pass(sample_pair());
        let password_tags: Vec<_> = pair.rules["password"].iter().map(|r| r.tag).collect();
        assert_eq!(password_tags, vec![Some(RuleTag::PasswordWhenTesting)]);
        assert_eq!(pair.rules["name"].len(), 3);
    }

    #[test]
    fn test_base_pass_keeps_existing_rules_first() {
        let mut pair = sample_pair();
        pair.rules.insert("name".into(), vec![FieldRule::required("Name is mandatory")]);

        let pair = SchemaMutator::default().base_pass(pair);
        let name_rules = &pair.rules["name"];
        assert_eq!(name_rules[0].message.as_deref(), Some("Name is mandatory"));
        // the common required rule is not stacked on top of an existing one
        assert_eq!(
            name_rules.iter().filter(|r| r.tag == Some(RuleTag::Required)).count(),
            1
        );
    }

    #[test]
    fn test_base_pass_is_idempotent() {
        let mutator = SchemaMutator::default();
        let once = mutator.base_pass(sample_pair());
        let twice = mutator.base_pass(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_base_pass_tolerates_missing_resource_opts() {
        let mut pair = sample_pair();
        pair.components["resource_opts"].properties = None;
        pair.components.shift_remove("password");
        let pair = SchemaMutator::default().base_pass(pair);
        assert!(pair.components["resource_opts"].properties.is_none());
        // rule lists are created even when the field is absent
        assert!(pair.rules.contains_key("password"));
    }

    #[test]
    fn test_unregistered_type_gets_base_pass_only() {
        let mutator = SchemaMutator::default();
        assert_eq!(
            mutator.mutate("kafka", sample_pair()),
            mutator.base_pass(sample_pair())
        );
    }

    #[test]
    fn test_bridge_type_tags_round_trip() {
        for bridge_type in BridgeType::ALL {
            assert_eq!(BridgeType::from_tag(bridge_type.tag()), Some(bridge_type));
        }
        assert_eq!(BridgeType::from_tag("kafka"), None);
        assert_eq!(BridgeType::Gcp.to_string(), "gcp_pubsub");
    }
}
