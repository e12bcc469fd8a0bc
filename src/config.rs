//! Configuration Management
//!
//! Handles persistent configuration storage for rulebridge.

use crate::api::Credentials;
use crate::i18n::Locale;
use crate::resource::StaticCatalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dashboard API root used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:18083/api/v5";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Dashboard API root
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Message language (`en`, `zh`)
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Overrides the embedded list of action connector types
    #[serde(default)]
    pub action_types: Option<Vec<String>>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("rulebridge").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`; a missing or malformed file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            },
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective base URL (CLI/env > config > default)
    pub fn effective_base_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get effective credentials (CLI/env > config); both halves are required
    pub fn effective_credentials(
        &self,
        cli_key: Option<&str>,
        cli_secret: Option<&str>,
    ) -> Option<Credentials> {
        let api_key = cli_key.map(str::to_string).or_else(|| self.api_key.clone())?;
        let api_secret = cli_secret
            .map(str::to_string)
            .or_else(|| self.api_secret.clone())?;
        Some(Credentials {
            api_key,
            api_secret,
        })
    }

    pub fn effective_locale(&self) -> Locale {
        self.locale
            .as_deref()
            .map(Locale::from_code)
            .unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::api::DEFAULT_TIMEOUT)
    }

    /// Connector catalog: the configured override or the embedded list
    pub fn catalog(&self) -> StaticCatalog {
        match &self.action_types {
            Some(types) => StaticCatalog::from_types(types.iter().cloned()),
            None => StaticCatalog::embedded(),
        }
    }

    /// Set base URL and save
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        url::Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
        self.base_url = Some(base_url.to_string());
        self.save()
    }

    /// Set credentials and save
    pub fn set_credentials(&mut self, api_key: &str, api_secret: &str) -> Result<()> {
        self.api_key = Some(api_key.to_string());
        self.api_secret = Some(api_secret.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ConnectorCatalog;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("rulebridge-test-{}-{}", std::process::id(), name))
            .join("config.json")
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_path("round-trip");
        let config = Config {
            base_url: Some("https://broker.example.com/api/v5".into()),
            locale: Some("zh".into()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_or_malformed_file_gives_defaults() {
        let path = temp_path("malformed");
        assert_eq!(Config::load_from(&path), Config::default());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_effective_values_prefer_cli() {
        let config = Config {
            base_url: Some("http://config:18083/api/v5".into()),
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.effective_base_url(Some("http://cli/api/v5")), "http://cli/api/v5");
        assert_eq!(config.effective_base_url(None), "http://config:18083/api/v5");
        assert_eq!(Config::default().effective_base_url(None), DEFAULT_BASE_URL);

        let creds = config.effective_credentials(Some("cli-key"), None).unwrap();
        assert_eq!(creds.api_key, "cli-key");
        assert_eq!(creds.api_secret, "secret");
        assert!(Config::default().effective_credentials(Some("k"), None).is_none());
    }

    #[test]
    fn test_catalog_override() {
        let config = Config {
            action_types: Some(vec!["webhook".into()]),
            ..Default::default()
        };
        let catalog = config.catalog();
        assert!(catalog.is_supported("webhook"));
        assert!(!catalog.is_supported("mysql"));
        assert!(Config::default().catalog().is_supported("mysql"));
    }

    #[test]
    fn test_timeout_default() {
        assert_eq!(Config::default().request_timeout(), crate::api::DEFAULT_TIMEOUT);
        let config = Config {
            request_timeout_secs: Some(3),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }
}
