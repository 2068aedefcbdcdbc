//! Triage LLM Provider Layer
//!
//! Implementations of the `ExtractionOracle` capability from `triage-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions in JSON mode
//!
//! # Examples
//!
//! ```
//! use triage_llm::MockProvider;
//! use triage_domain::ExtractionOracle;
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"{"patientName": "Sarah Johnson"}"#);
//! let result = provider.extract_structured("system", "email text").await.unwrap();
//! assert_eq!(result["patientName"], "Sarah Johnson");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;
pub mod repair;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use triage_domain::{ExtractionOracle, OracleFailure};

pub use openai::OpenAiProvider;
pub use repair::parse_json_object;

#[derive(Debug, Clone)]
enum MockReply {
    Response(String),
    Error,
}

/// Mock oracle for deterministic testing
///
/// This provider returns pre-configured responses without making any network
/// calls. Rules are matched in insertion order against the system prompt and
/// the user content; the first rule whose key appears in either wins.
/// Responses go through the same repair/parse step as real completions.
///
/// # Examples
///
/// ```
/// use triage_llm::MockProvider;
/// use triage_domain::ExtractionOracle;
///
/// # async fn example() {
/// let provider = MockProvider::new("{}");
/// provider.add_response("Filename: records.pdf", r#"{"diagnoses": ["Cervical strain"]}"#);
/// provider.add_error("Filename: broken.pdf");
///
/// let facts = provider.extract_structured("sys", "Filename: records.pdf").await.unwrap();
/// assert_eq!(facts["diagnoses"][0], "Cervical strain");
/// assert!(provider.extract_structured("sys", "Filename: broken.pdf").await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: MockReply,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_default(MockReply::Response(response.into()))
    }

    /// Create a MockProvider whose every unmatched call fails
    pub fn failing() -> Self {
        Self::with_default(MockReply::Error)
    }

    fn with_default(default_reply: MockReply) -> Self {
        Self {
            default_reply,
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Respond with `response` when `key` appears in the prompt or content
    pub fn add_response(&self, key: impl Into<String>, response: impl Into<String>) {
        lock(&self.rules).push((key.into(), MockReply::Response(response.into())));
    }

    /// Fail when `key` appears in the prompt or content
    pub fn add_error(&self, key: impl Into<String>) {
        lock(&self.rules).push((key.into(), MockReply::Error));
    }

    /// Get the number of times the oracle was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Reset the call count and call log
    pub fn reset_call_count(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        lock(&self.calls).clear();
    }

    /// Every `(system_prompt, user_content)` pair seen so far
    pub fn calls(&self) -> Vec<(String, String)> {
        lock(&self.calls).clone()
    }

    fn reply_for(&self, system_prompt: &str, user_content: &str) -> MockReply {
        lock(&self.rules)
            .iter()
            .find(|(key, _)| system_prompt.contains(key.as_str()) || user_content.contains(key.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl ExtractionOracle for MockProvider {
    async fn extract_structured(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<Map<String, Value>, OracleFailure> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.calls).push((system_prompt.to_string(), user_content.to_string()));

        match self.reply_for(system_prompt, user_content) {
            MockReply::Response(response) => parse_json_object(&response),
            MockReply::Error => Err(OracleFailure::Communication("Mock error".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

// A panicking test thread must not take the other tests' mock down with it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
