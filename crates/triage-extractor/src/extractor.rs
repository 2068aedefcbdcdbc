//! Core Extractor implementation

use crate::case::{fallback_case, finalize_case};
use crate::config::ExtractorConfig;
use crate::parser::{parse_attachment_facts, parse_case_response};
use crate::prompt::{case_system_prompt, AttachmentPromptBuilder, CaseCorpusBuilder, ATTACHMENT_SYSTEM_PROMPT};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use triage_domain::{
    AttachmentCategory, AttachmentFactsMap, ExtractedAttachmentFacts, ExtractedCase, ExtractionOracle,
    RawEmail,
};

/// The Extractor turns an intake email into a case record and per-attachment
/// facts
///
/// Neither operation fails outward: oracle failures degrade to the fallback
/// case or to absent facts.
#[derive(Clone)]
pub struct Extractor {
    oracle: Arc<dyn ExtractionOracle>,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create a new Extractor
    pub fn new(oracle: Arc<dyn ExtractionOracle>, config: ExtractorConfig) -> Self {
        Self { oracle, config }
    }

    /// Extractor configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the case record from an email
    pub async fn extract_case(&self, email: &RawEmail) -> ExtractedCase {
        let corpus = CaseCorpusBuilder::new(email, self.config.corpus_attachment_chars).build();
        debug!("Case corpus length: {} chars", corpus.chars().count());

        let json = match self.oracle.extract_structured(&case_system_prompt(), &corpus).await {
            Ok(json) => json,
            Err(e) => {
                warn!(
                    "Case extraction via {} failed, using fallback: {}",
                    self.oracle.model_name(),
                    e
                );
                return fallback_case(email);
            }
        };

        match parse_case_response(&json) {
            Ok(parsed) => {
                let case = finalize_case(parsed, email);
                info!(
                    "Extracted case: patient {:?}, {} attachment classifications",
                    case.patient_name,
                    case.attachment_classifications.len()
                );
                case
            }
            Err(e) => {
                warn!("Case response has unexpected shape, using fallback: {}", e);
                fallback_case(email)
            }
        }
    }

    /// Extract facts from a single attachment
    ///
    /// `None` when the oracle fails; an empty answer yields empty facts.
    pub async fn extract_attachment_facts(
        &self,
        filename: &str,
        content: &str,
        category: AttachmentCategory,
    ) -> Option<ExtractedAttachmentFacts> {
        let prompt = AttachmentPromptBuilder::new(
            filename,
            category,
            content,
            self.config.attachment_content_chars,
        )
        .build();

        match self.oracle.extract_structured(ATTACHMENT_SYSTEM_PROMPT, &prompt).await {
            Ok(json) => Some(parse_attachment_facts(&json)),
            Err(e) => {
                warn!("Attachment extraction failed for '{}': {}", filename, e);
                None
            }
        }
    }

    /// Extract facts from every retained attachment of an email
    ///
    /// Calls are issued in attachment order with at most
    /// `max_concurrent_attachments` in flight; all of them settle before this
    /// returns. Each attachment is tagged with its classified category.
    pub async fn extract_all_attachment_facts(
        &self,
        email: &RawEmail,
        case: &ExtractedCase,
    ) -> AttachmentFactsMap {
        let limit = Arc::new(Semaphore::new(
            self.config
                .max_concurrent_attachments
                .clamp(1, Semaphore::MAX_PERMITS),
        ));

        let mut seen = Vec::new();
        let tasks: Vec<_> = email
            .retained_attachments()
            .filter(|att| {
                if seen.contains(&att.filename) {
                    return false;
                }
                seen.push(att.filename.clone());
                true
            })
            .map(|att| {
                let category = case
                    .classification(&att.filename)
                    .map(|c| c.category)
                    .unwrap_or(AttachmentCategory::Other);
                let limit = Arc::clone(&limit);
                async move {
                    // The semaphore is never closed
                    let _permit = limit.acquire().await.ok();
                    let facts = self
                        .extract_attachment_facts(&att.filename, &att.content, category)
                        .await;
                    (att.filename.clone(), facts)
                }
            })
            .collect();

        info!("Extracting facts from {} attachments", tasks.len());

        join_all(tasks).await.into_iter().collect()
    }
}
