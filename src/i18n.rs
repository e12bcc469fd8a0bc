//! Localization
//!
//! Message catalogs are embedded at compile time and looked up by dotted
//! keys such as `RuleEngine.redisCommandError`. Placeholders use the
//! `{name}` form.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded message catalogs (compiled into the binary)
const EN_MESSAGES: &str = include_str!("locales/en.json");
const ZH_MESSAGES: &str = include_str!("locales/zh.json");

/// Supported dashboard languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Parse a locale code, falling back to English for anything unknown
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" => Locale::Zh,
            _ => Locale::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }
}

/// Produces user-facing strings for validator errors and form hints.
pub trait Translator: Send + Sync {
    /// Look up `key` and substitute `{name}` placeholders from `params`.
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;
}

/// Root structure of locales/*.json: namespace -> key -> message
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct Messages(HashMap<String, HashMap<String, String>>);

impl Messages {
    fn get(&self, key: &str) -> Option<&str> {
        let (namespace, name) = key.split_once('.')?;
        self.0.get(namespace)?.get(name).map(String::as_str)
    }
}

fn load(locale: Locale) -> &'static Messages {
    static EN: OnceLock<Messages> = OnceLock::new();
    static ZH: OnceLock<Messages> = OnceLock::new();

    let (cell, content) = match locale {
        Locale::En => (&EN, EN_MESSAGES),
        Locale::Zh => (&ZH, ZH_MESSAGES),
    };

    cell.get_or_init(|| {
        serde_json::from_str(content).unwrap_or_else(|e| {
            tracing::error!("Failed to parse embedded {} messages: {}", locale.code(), e);
            Messages(HashMap::new())
        })
    })
}

/// Translator backed by the embedded catalogs.
///
/// Missing keys fall back to English, then to the key itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog {
    locale: Locale,
}

impl Catalog {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = load(self.locale)
            .get(key)
            .or_else(|| load(Locale::En).get(key))
            .unwrap_or(key);

        params
            .iter()
            .fold(template.to_string(), |acc, (name, value)| {
                acc.replace(&format!("{{{}}}", name), value)
            })
    }
}
