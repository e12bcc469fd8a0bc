//! Per-connector schema specializations
//!
//! Each function runs the base pass first, then patches the fields its
//! connector gets wrong or cannot describe. Fields that are missing or
//! shaped differently than expected are left alone.

use super::mutator::SchemaMutator;
use super::rules::{
    append_rules, settle, FieldRule, RuleTag, Trigger, ValidationContext, ValidationError,
};
use super::types::{ComponentProps, Components, SchemaPair};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Redis deployment modes
pub const REDIS_TYPES: &[&str] = &["single", "sentinel", "cluster"];

/// MongoDB deployment modes
pub const MONGO_TYPES: &[&str] = &["single", "rs", "sharded"];

/// Format hint enabling SQL-like syntax highlighting
const SQL_FORMAT: &str = "sql";

/// A command word followed by at least one argument
const REDIS_COMMAND_PATTERN: &str = r"^[A-Za-z]+(\s+\S+)+$";

fn redis_command_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(REDIS_COMMAND_PATTERN).expect("redis command pattern is valid"))
}

/// Whether a command template is well formed once its lines are joined
pub fn is_valid_redis_command(template: &str) -> bool {
    let joined = template.replace('\n', " ");
    redis_command_regex().is_match(joined.trim())
}

pub(super) fn redis(mutator: &SchemaMutator, pair: SchemaPair) -> SchemaPair {
    let SchemaPair {
        mut components,
        mut rules,
    } = mutator.base_pass(pair);

    force_symbols(&mut components, "redis_type", REDIS_TYPES);
    coerce_servers(&mut components);

    if let Some(template) = components.get_mut("command_template") {
        if template.is_string_array() {
            template.field_type = Some("string".to_string());
            template.format = Some(SQL_FORMAT.to_string());
            template.default = Some(Value::String(String::new()));
        }
    }

    if rules.contains_key("command_template") {
        let message = mutator
            .translator()
            .translate("RuleEngine.redisCommandError", &[]);
        let validator = move |value: &Value, _: &ValidationContext| {
            if is_valid_redis_command(value.as_str().unwrap_or_default()) {
                settle(Ok(()))
            } else {
                settle(Err(ValidationError::new(message.clone())))
            }
        };
        append_rules(
            &mut rules,
            "command_template",
            vec![FieldRule::validator(validator, Trigger::Blur).tagged(RuleTag::RedisCommand)],
        );
    }

    SchemaPair { components, rules }
}

pub(super) fn mongodb(mutator: &SchemaMutator, pair: SchemaPair) -> SchemaPair {
    let SchemaPair {
        mut components,
        rules,
    } = mutator.base_pass(pair);

    force_symbols(&mut components, "mongo_type", MONGO_TYPES);
    mark_sql(&mut components, "payload_template");
    coerce_servers(&mut components);

    SchemaPair { components, rules }
}

pub(super) fn gcp(mutator: &SchemaMutator, pair: SchemaPair) -> SchemaPair {
    let SchemaPair {
        mut components,
        mut rules,
    } = mutator.base_pass(pair);
    let translator = mutator.translator();

    // The backend cannot say this field is an upload
    if let Some(account) = components.get_mut("service_account_json") {
        if account.is_type("string") {
            account.format = Some("file".to_string());
            account.component_props = Some(ComponentProps {
                accept: Some(".json".to_string()),
                tip: Some(translator.translate("Base.uploadTip", &[("format", ".json")])),
                ..Default::default()
            });
        }
    }
    mark_sql(&mut components, "payload_template");

    let message = translator.translate("RuleEngine.accountJSONError", &[]);
    let validator = move |value: &Value, _: &ValidationContext| {
        let parsed = value
            .as_str()
            .is_some_and(|text| serde_json::from_str::<Value>(text).is_ok());
        if parsed {
            settle(Ok(()))
        } else {
            settle(Err(ValidationError::new(message.clone())))
        }
    };
    append_rules(
        &mut rules,
        "service_account_json",
        vec![FieldRule::validator(validator, Trigger::Blur).tagged(RuleTag::ServiceAccountJson)],
    );

    SchemaPair { components, rules }
}

/// DynamoDB and RocketMQ: highlight the message template
pub(super) fn sql_template(mutator: &SchemaMutator, pair: SchemaPair) -> SchemaPair {
    let SchemaPair {
        mut components,
        rules,
    } = mutator.base_pass(pair);

    mark_sql(&mut components, "template");

    SchemaPair { components, rules }
}

/// Replace an enum's symbols with the canonical list and forbid clearing it
fn force_symbols(components: &mut Components, field: &str, symbols: &[&str]) {
    if let Some(descriptor) = components.get_mut(field) {
        if descriptor.symbols.is_some() {
            descriptor.symbols = Some(symbols.iter().map(|s| Value::from(*s)).collect());
            descriptor.component_props = Some(ComponentProps {
                clearable: Some(false),
                ..Default::default()
            });
        }
    }
}

/// Edit server lists as one multi-line string
fn coerce_servers(components: &mut Components) {
    if let Some(servers) = components.get_mut("servers") {
        if servers.is_string_or_string_array() {
            servers.field_type = Some("string".to_string());
            servers.component_props = Some(ComponentProps {
                input_type: Some("textarea".to_string()),
                rows: Some(3),
                ..Default::default()
            });
        }
    }
}

fn mark_sql(components: &mut Components, field: &str) {
    if let Some(descriptor) = components.get_mut(field).filter(|d| d.is_type("string")) {
        descriptor.format = Some(SQL_FORMAT.to_string());
    }
}
