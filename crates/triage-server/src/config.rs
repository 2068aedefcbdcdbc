//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files: bind address, database location, oracle
//! endpoint and extraction limits. Environment variables override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use triage_extractor::ExtractorConfig;
use triage_llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is present but unusable
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port
    pub bind_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Extraction oracle endpoint
    pub oracle: OracleSettings,

    /// Extraction limits
    pub extractor: ExtractorConfig,
}

/// Extraction oracle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    /// OpenAI-compatible API base
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// API key; normally supplied through `OPENAI_API_KEY`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl OracleSettings {
    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 3001,
            database_path: PathBuf::from("data/triage.db"),
            oracle: OracleSettings::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `OPENAI_API_KEY`, `OPENAI_MODEL` and `PORT` overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.oracle.api_key = Some(key);
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            self.oracle.model = model;
        }
        if let Some(port) = lookup("PORT") {
            self.bind_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a port number: {}", port)))?;
        }
        self.validate()
    }

    /// Check values that parse but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.timeout_secs == 0 {
            return Err(ConfigError::Invalid("oracle.timeout_secs must be greater than 0".to_string()));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_port, 3001);
        assert_eq!(config.database_path, PathBuf::from("data/triage.db"));
        assert_eq!(config.oracle.model, "gpt-4-turbo-preview");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            ..Default::default()
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:3001");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 9000
            database_path = "/var/lib/triage/cases.db"

            [oracle]
            base_url = "http://localhost:8080/v1"
            timeout_secs = 30

            [extractor]
            max_concurrent_attachments = 2
        "#;

        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.oracle.base_url, "http://localhost:8080/v1");
        assert_eq!(config.oracle.model, DEFAULT_MODEL);
        assert_eq!(config.oracle.timeout(), Duration::from_secs(30));
        assert_eq!(config.extractor.max_concurrent_attachments, 2);
        assert_eq!(config.extractor.attachment_content_chars, 4_000);
    }

    #[test]
    fn test_invalid_extractor_section_rejected() {
        let result = ServerConfig::from_toml("[extractor]\nmax_concurrent_attachments = 0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("PORT", "8088"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.oracle.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.oracle.model, "gpt-4o-mini");
        assert_eq!(config.bind_port, 8088);
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = ServerConfig::default();
        let result = config.apply_overrides(|key| (key == "PORT").then(|| "http".to_string()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
