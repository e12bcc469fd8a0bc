//! Connector form schemas
//!
//! The dashboard renders connector forms from a `{components, rules}`
//! pair. This module models that pair and rewrites it per connector type
//! before rendering.
//!
//! # Architecture
//!
//! - [`types`] - Field descriptors and the schema pair
//! - [`rules`] - Validation rules, validators and the form validation runner
//! - [`mutator`] - Base pass and the per-connector specialization registry
//!
//! # Example
//!
//! ```ignore
//! use rulebridge::schema::{load_components, SchemaMutator, SchemaPair};
//!
//! let mutator = SchemaMutator::default();
//! let components = load_components("redis.json".as_ref())?;
//! let pair = SchemaPair::from_components(components, mutator.translator());
//! let pair = mutator.mutate("redis", pair);
//! ```

mod common_rules;
mod connectors;
mod mutator;
pub mod rules;
mod types;

pub use common_rules::{common_id_rules, password_rules, COMMON_ID_MAX_LENGTH};
pub use connectors::{is_valid_redis_command, MONGO_TYPES, REDIS_TYPES};
pub use mutator::{BridgeType, SchemaMutator, Specialization};
pub use rules::{
    validate_form, FieldError, FieldRule, RuleTag, SchemaRules, Trigger, ValidationContext,
    ValidationError, Validator,
};
pub use types::{load_components, parse_components, ComponentProps, Components, FieldDescriptor, SchemaPair};
