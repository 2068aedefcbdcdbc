//! Persisted record module - what the store hands back

use crate::facts::ExtractedAttachmentFacts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier for a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(i64);

impl CaseId {
    /// Wrap a raw row id
    ///
    /// This is primarily for storage layer deserialization.
    pub fn from_value(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw row id
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CaseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(CaseId)
    }
}

/// A stored case row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCase {
    /// Case identity
    pub id: CaseId,
    /// Examinee name
    pub patient_name: Option<String>,
    /// Referral case number
    pub case_number: Option<String>,
    /// Examination date, after enrichment
    pub exam_date: Option<String>,
    /// Examination type
    pub exam_type: Option<String>,
    /// Referring party or law firm
    pub referring_party: Option<String>,
    /// Examination location
    pub location: Option<String>,
    /// Accumulated uncertainty explanations
    pub uncertainty_notes: Option<String>,
    /// Creation timestamp (UTC, `YYYY-MM-DD HH:MM:SS`)
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

/// A stored source email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEmail {
    /// Row identity
    pub id: i64,
    /// Owning case
    pub case_id: CaseId,
    /// Subject line
    pub subject: String,
    /// Sender address
    pub sender: String,
    /// Recipient addresses, in original order
    pub recipients: Vec<String>,
    /// Full body text
    pub body: String,
    /// When the email was stored
    pub received_at: String,
}

/// A stored attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAttachment {
    /// Row identity
    pub id: i64,
    /// Owning case
    pub case_id: CaseId,
    /// Attachment filename
    pub filename: String,
    /// Category name
    pub category: String,
    /// First characters of the original attachment content
    pub content_preview: Option<String>,
    /// Facts mined from the attachment, when extraction succeeded
    pub attachment_data: Option<ExtractedAttachmentFacts>,
    /// When the attachment was stored
    pub created_at: String,
}

/// A case with its emails and attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseWithRelations {
    /// The case row
    pub case: PersistedCase,
    /// Emails referencing the case
    pub emails: Vec<PersistedEmail>,
    /// Attachments referencing the case
    pub attachments: Vec<PersistedAttachment>,
}
