//! Raw intake email module

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller input that cannot enter the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of subject, sender, body is missing or blank
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// A single plain-text attachment carried by an intake email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAttachment {
    /// Filename as sent
    #[serde(default)]
    pub filename: String,
    /// Full document body as plain text
    #[serde(default)]
    pub content: String,
}

impl RawAttachment {
    /// Create a new attachment
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Attachments with a blank filename are not carried downstream
    pub fn is_retained(&self) -> bool {
        !self.filename.trim().is_empty()
    }
}

/// An intake email as received from the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmail {
    /// Subject line
    #[serde(default)]
    pub subject: String,
    /// Sender address
    #[serde(default)]
    pub sender: String,
    /// Recipient addresses, in order
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Full body text
    #[serde(default)]
    pub body: String,
    /// Attachments, in declared order
    #[serde(default)]
    pub attachments: Vec<RawAttachment>,
}

impl RawEmail {
    /// Check the fields the pipeline cannot run without
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.sender.trim().is_empty() {
            missing.push("sender");
        }
        if self.body.trim().is_empty() {
            missing.push("body");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(missing))
        }
    }

    /// Attachments that survive filename validation, in declared order
    pub fn retained_attachments(&self) -> impl Iterator<Item = &RawAttachment> {
        self.attachments.iter().filter(|att| att.is_retained())
    }

    /// Look up an attachment by filename
    ///
    /// An exact match wins; otherwise the first attachment whose name equals
    /// `filename` once surrounding whitespace is ignored.
    pub fn find_attachment(&self, filename: &str) -> Option<&RawAttachment> {
        self.retained_attachments()
            .find(|att| att.filename == filename)
            .or_else(|| {
                let wanted = filename.trim();
                self.retained_attachments()
                    .find(|att| att.filename.trim() == wanted)
            })
    }
}
