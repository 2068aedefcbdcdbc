//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{AttachmentFactsMap, CaseId, CaseWithRelations, ExtractedCase, RawEmail};
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure of the structured-extraction oracle
///
/// Never propagates past the extraction policies; they degrade to fallback
/// data instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleFailure {
    /// No credentials are configured for the oracle
    #[error("Oracle not configured: {0}")]
    NotConfigured(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The oracle answered with nothing
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// The answer is not a JSON object of the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl OracleFailure {
    /// Human-readable reason, without the kind prefix
    pub fn reason(&self) -> &str {
        match self {
            OracleFailure::NotConfigured(r)
            | OracleFailure::Communication(r)
            | OracleFailure::EmptyResponse(r)
            | OracleFailure::InvalidResponse(r) => r,
        }
    }
}

/// Structured-extraction capability (e.g. a language model in JSON mode)
///
/// Implemented by the infrastructure layer (triage-llm). Given a fixed system
/// prompt and a user-content string, returns a JSON object or fails.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    /// Run one extraction call
    async fn extract_structured(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<Map<String, Value>, OracleFailure>;

    /// Name of the backing model, for logging
    fn model_name(&self) -> &str {
        "oracle"
    }
}

/// Trait for storing and retrieving cases
///
/// Implemented by the infrastructure layer (triage-store)
pub trait CaseStore {
    /// Error type for store operations
    type Error;

    /// Persist a case, its source email and its attachments as one unit
    fn create_case(
        &mut self,
        email: &RawEmail,
        case: &ExtractedCase,
        facts: &AttachmentFactsMap,
    ) -> Result<CaseId, Self::Error>;

    /// Get a case with its relations by ID
    fn get_case(&self, id: CaseId) -> Result<Option<CaseWithRelations>, Self::Error>;

    /// Every case, newest first, with relations
    fn list_cases(&self) -> Result<Vec<CaseWithRelations>, Self::Error>;

    /// Delete a case and everything it owns; false if it did not exist
    fn delete_case(&mut self, id: CaseId) -> Result<bool, Self::Error>;
}
