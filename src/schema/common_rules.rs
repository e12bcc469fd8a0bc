//! Rules shared by every connector form

use super::rules::{
    is_empty_value, settle, FieldRule, RuleTag, Trigger, ValidationContext, ValidationError,
};
use crate::i18n::Translator;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Letters and digits first, then letters, digits, `-` and `_`
const COMMON_ID_PATTERN: &str = r"^[A-Za-z0-9]+[A-Za-z0-9\-_]*$";

/// Longest name the backend accepts
pub const COMMON_ID_MAX_LENGTH: usize = 255;

fn common_id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(COMMON_ID_PATTERN).expect("common id pattern is valid"))
}

/// Rules for `password` while the user is testing a connection.
///
/// A plain submit may keep a stored password, but a live connection test
/// needs the secret in hand.
pub fn password_rules(translator: &dyn Translator) -> Vec<FieldRule> {
    let message = translator.translate("RuleEngine.passwordRequiredForTest", &[]);

    let validator = move |value: &Value, ctx: &ValidationContext| {
        if ctx.testing_connection && is_empty_value(value) {
            settle(Err(ValidationError::new(message.clone())))
        } else {
            settle(Ok(()))
        }
    };

    vec![FieldRule::validator(validator, Trigger::Blur).tagged(RuleTag::PasswordWhenTesting)]
}

/// Naming rules for the `name` field: required, charset, length
pub fn common_id_rules(translator: &dyn Translator) -> Vec<FieldRule> {
    let required = translator.translate("Base.required", &[("field", "Name")]);
    let charset_message = translator.translate("Base.commonIdError", &[]);
    let max = COMMON_ID_MAX_LENGTH.to_string();
    let length_message = translator.translate("Base.maxLength", &[("max", max.as_str())]);

    let charset = move |value: &Value, _: &ValidationContext| match value.as_str() {
        Some(s) if !s.is_empty() && !common_id_regex().is_match(s) => {
            settle(Err(ValidationError::new(charset_message.clone())))
        },
        _ => settle(Ok(())),
    };

    let length = move |value: &Value, _: &ValidationContext| match value.as_str() {
        Some(s) if s.chars().count() > COMMON_ID_MAX_LENGTH => {
            settle(Err(ValidationError::new(length_message.clone())))
        },
        _ => settle(Ok(())),
    };

    vec![
        FieldRule::required(required),
        FieldRule::validator(charset, Trigger::Blur).tagged(RuleTag::IdCharset),
        FieldRule::validator(length, Trigger::Blur).tagged(RuleTag::IdLength),
    ]
}
