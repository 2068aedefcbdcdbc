//! Triage Extractor
//!
//! Turns IME intake emails into structured, persisted case records.
//!
//! # Overview
//!
//! An intake email carries a referral in free text plus plain-text
//! attachments. The extractor asks an oracle for the case fields and a
//! category for every attachment, then asks again per attachment for dates,
//! providers and diagnoses. Results are post-processed so every record is
//! complete and reviewable even when the oracle is unavailable.
//!
//! # Architecture
//!
//! ```text
//! RawEmail → Case Extraction → Attachment Extraction (bounded fan-out)
//!          → Enrichment Merge → CaseStore (one transaction)
//! ```
//!
//! # Key Features
//!
//! - **Graceful degradation**: Oracle failures become a fallback case or absent facts
//! - **Completeness**: Exactly one classification per retained attachment
//! - **Confidence floor**: Missing required fields are flagged `low` with a note
//! - **Normalization**: Heterogeneous oracle output coerced in one place
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use triage_domain::RawEmail;
//! use triage_extractor::{ExtractorConfig, IntakePipeline};
//! use triage_llm::MockProvider;
//! use triage_store::SqliteStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = Arc::new(MockProvider::new(r#"{"patientName": "Sarah Johnson"}"#));
//! let store = SqliteStore::new(":memory:")?;
//! let pipeline = IntakePipeline::new(oracle, store, ExtractorConfig::default())?;
//!
//! let email = RawEmail {
//!     subject: "IME Referral".to_string(),
//!     sender: "referrals@premiumlaw.com".to_string(),
//!     recipients: vec![],
//!     body: "Please schedule an IME for Sarah Johnson.".to_string(),
//!     attachments: vec![],
//! };
//!
//! let record = pipeline.process_email(email).await?;
//! println!("Created case {}", record.case.id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod case;
mod config;
mod error;
mod extractor;
mod merge;
mod parser;
mod pipeline;
mod prompt;

#[cfg(test)]
mod tests;

pub use case::{fallback_case, finalize_case, FALLBACK_NOTE, FALLBACK_REASON};
pub use config::ExtractorConfig;
pub use error::IntakeError;
pub use extractor::Extractor;
pub use merge::merge;
pub use parser::{parse_attachment_facts, parse_case_response, ParsedCase};
pub use pipeline::IntakePipeline;
pub use prompt::truncate_chars;
