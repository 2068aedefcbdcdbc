//! OpenAI Provider Implementation
//!
//! Provides integration with the OpenAI chat completions API, or any
//! OpenAI-compatible service (a local Ollama `/v1` endpoint works too).
//!
//! # Features
//!
//! - Async HTTP communication with the chat completions endpoint
//! - JSON-object response format and low temperature on every call
//! - Configurable endpoint, model and timeout
//! - No retries: a failed call is reported once and the caller falls back
//!
//! # Examples
//!
//! ```no_run
//! use triage_llm::OpenAiProvider;
//!
//! // Reads OPENAI_API_KEY and OPENAI_MODEL
//! let provider = OpenAiProvider::from_env().unwrap();
//! ```

use crate::repair::parse_json_object;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;
use triage_domain::{ExtractionOracle, OracleFailure};

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model when `OPENAI_MODEL` is unset
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default timeout for LLM requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Sampling temperature used for every extraction call
pub const EXTRACTION_TEMPERATURE: f32 = 0.1;

/// OpenAI-compatible provider for structured extraction
///
/// The HTTP client is built once at construction. Without an API key the
/// provider still constructs, but every call fails with
/// [`OracleFailure::NotConfigured`].
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `base_url`: API base (e.g., "https://api.openai.com/v1")
    /// - `model`: Model to use (e.g., "gpt-4-turbo-preview")
    /// - `api_key`: Bearer token; `None` leaves the provider unconfigured
    /// - `timeout`: Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, OracleFailure> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleFailure::Communication(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    /// Create a provider from `OPENAI_API_KEY` and `OPENAI_MODEL`
    pub fn from_env() -> Result<Self, OracleFailure> {
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(
            DEFAULT_BASE_URL,
            model,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Run one chat completion and return the raw message content
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - No API key is configured
    /// - Network communication fails or the API answers non-2xx
    /// - The response carries no message content
    pub async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, OracleFailure> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            OracleFailure::NotConfigured("OPENAI_API_KEY environment variable is missing".to_string())
        })?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_content },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: EXTRACTION_TEMPERATURE,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OracleFailure::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleFailure::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleFailure::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| OracleFailure::EmptyResponse("No response from OpenAI".to_string()))
    }
}

#[async_trait]
impl ExtractionOracle for OpenAiProvider {
    async fn extract_structured(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<Map<String, Value>, OracleFailure> {
        let content = self.complete(system_prompt, user_content).await?;
        debug!(model = %self.model, "Oracle response length: {} chars", content.len());
        parse_json_object(&content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
