//! Validation rules
//!
//! Each form field owns an ordered list of [`FieldRule`]s. A rule can
//! demand a value, run an async [`Validator`], or both. Rules appended by
//! this crate carry a [`RuleTag`] so that re-applying a schema pass never
//! stacks the same rule twice.

use super::types::Components;
use crate::i18n::Translator;
use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Field name -> ordered rules
pub type SchemaRules = IndexMap<String, Vec<FieldRule>>;

/// Future returned by every validator
pub type ValidationFuture = BoxFuture<'static, Result<(), ValidationError>>;

/// A rejected value, carrying the localized message shown under the field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A validation failure attributed to a form field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Form state a validator may depend on
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext {
    /// Set while the user runs "test connection" instead of submitting
    pub testing_connection: bool,
}

impl ValidationContext {
    pub fn testing_connection() -> Self {
        Self {
            testing_connection: true,
        }
    }
}

/// Async check of a single field value
pub trait Validator: Send + Sync {
    fn validate(&self, value: &Value, ctx: &ValidationContext) -> ValidationFuture;
}

impl<F> Validator for F
where
    F: Fn(&Value, &ValidationContext) -> ValidationFuture + Send + Sync,
{
    fn validate(&self, value: &Value, ctx: &ValidationContext) -> ValidationFuture {
        self(value, ctx)
    }
}

/// Wrap a synchronous outcome in a [`ValidationFuture`]
pub fn settle(result: Result<(), ValidationError>) -> ValidationFuture {
    futures::future::ready(result).boxed()
}

/// When the form framework runs a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[default]
    Blur,
    Change,
}

/// Identity of a rule appended by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTag {
    Required,
    PasswordWhenTesting,
    IdCharset,
    IdLength,
    RedisCommand,
    ServiceAccountJson,
}

/// One validation rule of a form field
#[derive(Clone, Default)]
pub struct FieldRule {
    pub tag: Option<RuleTag>,
    pub required: bool,
    pub validator: Option<Arc<dyn Validator>>,
    pub trigger: Trigger,
    pub message: Option<String>,
}

impl FieldRule {
    /// Rule rejecting empty values
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            tag: Some(RuleTag::Required),
            required: true,
            validator: None,
            trigger: Trigger::Blur,
            message: Some(message.into()),
        }
    }

    /// Rule running `validator` on the given trigger
    pub fn validator(validator: impl Validator + 'static, trigger: Trigger) -> Self {
        Self {
            validator: Some(Arc::new(validator)),
            trigger,
            ..Default::default()
        }
    }

    pub fn tagged(mut self, tag: RuleTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Run the rule against a field value
    pub async fn check(&self, value: &Value, ctx: &ValidationContext) -> Result<(), ValidationError> {
        if self.required && is_empty_value(value) {
            return Err(ValidationError::new(
                self.message.clone().unwrap_or_else(|| "required".to_string()),
            ));
        }
        match &self.validator {
            Some(validator) => validator.validate(value, ctx).await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("tag", &self.tag)
            .field("required", &self.required)
            .field("validator", &self.validator.as_ref().map(|_| "<validator>"))
            .field("trigger", &self.trigger)
            .field("message", &self.message)
            .finish()
    }
}

/// Validators compare by presence: two rules built by the same
/// constructor are equal even though their closures are distinct.
impl PartialEq for FieldRule {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.required == other.required
            && self.trigger == other.trigger
            && self.message == other.message
            && self.validator.is_some() == other.validator.is_some()
    }
}

impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FieldRule", 5)?;
        state.serialize_field("tag", &self.tag)?;
        state.serialize_field("required", &self.required)?;
        state.serialize_field("trigger", &self.trigger)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("validator", &self.validator.is_some())?;
        state.end()
    }
}

/// Null, empty string, or empty array
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Append rules to a field, creating its list if absent.
///
/// A tagged rule is skipped when a rule with the same tag is already
/// present, which keeps repeated passes idempotent.
pub fn append_rules(rules: &mut SchemaRules, field: &str, new_rules: Vec<FieldRule>) {
    let existing = rules.entry(field.to_string()).or_default();
    for rule in new_rules {
        let duplicate = rule
            .tag
            .is_some_and(|tag| existing.iter().any(|r| r.tag == Some(tag)));
        if !duplicate {
            existing.push(rule);
        }
    }
}

/// Initial rules for a schema: one `required` rule per required top-level field
pub fn derive_rules(components: &Components, translator: &dyn Translator) -> SchemaRules {
    components
        .iter()
        .filter(|(_, descriptor)| descriptor.required == Some(true))
        .map(|(name, descriptor)| {
            let label = descriptor.label.as_deref().unwrap_or(name);
            let message = translator.translate("Base.required", &[("field", label)]);
            (name.clone(), vec![FieldRule::required(message)])
        })
        .collect()
}

/// Validate submitted values against every rule of a schema.
///
/// Rules of a field run in order and stop at the first failure; all
/// failing fields are reported.
pub async fn validate_form(
    rules: &SchemaRules,
    values: &Map<String, Value>,
    ctx: &ValidationContext,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    for (field, field_rules) in rules {
        let value = values.get(field).unwrap_or(&Value::Null);
        for rule in field_rules {
            if let Err(e) = rule.check(value, ctx).await {
                errors.push(FieldError {
                    field: field.clone(),
                    message: e.message,
                });
                break;
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
