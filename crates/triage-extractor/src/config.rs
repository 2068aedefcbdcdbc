//! Configuration for the extraction policies

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

/// Configuration for the Extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Characters of each attachment included in the case-level corpus
    pub corpus_attachment_chars: usize,

    /// Characters of an attachment sent for fact extraction
    pub attachment_content_chars: usize,

    /// Maximum attachment extraction calls in flight per email
    pub max_concurrent_attachments: usize,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.corpus_attachment_chars == 0 {
            return Err("corpus_attachment_chars must be greater than 0".to_string());
        }
        if self.attachment_content_chars == 0 {
            return Err("attachment_content_chars must be greater than 0".to_string());
        }
        if self.max_concurrent_attachments == 0 {
            return Err("max_concurrent_attachments must be greater than 0".to_string());
        }
        if self.max_concurrent_attachments > Semaphore::MAX_PERMITS {
            return Err(format!(
                "max_concurrent_attachments must be at most {}",
                Semaphore::MAX_PERMITS
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            corpus_attachment_chars: 1_000,
            attachment_content_chars: 4_000,
            max_concurrent_attachments: 4,
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str)
            .map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
