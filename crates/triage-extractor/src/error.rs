//! Error types for the intake pipeline
//!
//! Oracle failures never show up here: the extraction policies recover them
//! into fallback data.

use thiserror::Error;
use triage_domain::{CaseId, ValidationError};

/// Errors surfaced to callers of the pipeline
#[derive(Error, Debug)]
pub enum IntakeError {
    /// Malformed caller input, rejected before extraction
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No case with the requested ID
    #[error("Case with id {0} not found")]
    NotFound(CaseId),

    /// The store could not commit or read; nothing was written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
