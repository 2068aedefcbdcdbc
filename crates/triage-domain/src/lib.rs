//! Triage Domain Layer
//!
//! This crate contains the domain model for IME intake triage. It defines the
//! value types that flow through the extraction pipeline and the trait
//! interfaces that the infrastructure layers implement.
//!
//! ## Key Concepts
//!
//! - **RawEmail**: An intake email with its plain-text attachments
//! - **ExtractedCase**: The structured case record, with per-field confidence
//! - **Classification**: Each attachment sorted into one of four categories
//! - **Attachment Facts**: Dates, providers and diagnoses mined from a document
//! - **Persisted records**: What the store hands back, keyed by [`CaseId`]
//!
//! ## Architecture
//!
//! - Pure data and validation only
//! - Infrastructure implementations (oracle, store) live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod email;
pub mod facts;
pub mod record;
pub mod traits;

// Re-exports for convenience
pub use case::{
    AttachmentCategory, AttachmentClassification, CaseField, ConfidenceLevel, ExtractedCase,
};
pub use email::{RawAttachment, RawEmail, ValidationError};
pub use facts::{AttachmentFactsMap, ExtractedAttachmentFacts};
pub use record::{CaseId, CaseWithRelations, PersistedAttachment, PersistedCase, PersistedEmail};
pub use traits::{CaseStore, ExtractionOracle, OracleFailure};
