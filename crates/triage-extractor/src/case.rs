//! Case-level post-processing
//!
//! Turns a parsed oracle draft into a case that satisfies the completeness
//! and confidence-floor rules, or builds the deterministic fallback when the
//! oracle could not be used.

use crate::parser::ParsedCase;
use std::collections::HashSet;
use tracing::debug;
use triage_domain::{AttachmentClassification, CaseField, ConfidenceLevel, ExtractedCase, RawEmail};

/// Note recorded when the oracle could not produce a case
pub const FALLBACK_NOTE: &str = "LLM extraction failed - manual review required";

/// Classification reason used by the fallback record
pub const FALLBACK_REASON: &str = "Extraction failed";

/// Reason used when the oracle returned no classifications at all
pub const UNCATEGORIZED_REASON: &str = "Unable to categorize from email content";

/// Reason used for attachments the oracle left out
pub const NOT_CATEGORIZED_REASON: &str = "Not categorized by LLM";

/// Apply the post-processing rules to a parsed draft
pub fn finalize_case(parsed: ParsedCase, email: &RawEmail) -> ExtractedCase {
    let ParsedCase {
        mut case,
        classifications,
    } = parsed;

    flag_missing_fields(&mut case);

    case.attachment_classifications = match classifications {
        None => email
            .retained_attachments()
            .map(|att| AttachmentClassification::other(att.filename.clone(), UNCATEGORIZED_REASON))
            .collect(),
        Some(returned) => reconcile(returned, email),
    };

    case
}

/// The record produced when the oracle failed or answered nonsense
pub fn fallback_case(email: &RawEmail) -> ExtractedCase {
    let mut seen = HashSet::new();
    ExtractedCase {
        uncertainty_notes: Some(FALLBACK_NOTE.to_string()),
        attachment_classifications: email
            .retained_attachments()
            .filter(|att| seen.insert(att.filename.as_str()))
            .map(|att| AttachmentClassification::other(att.filename.clone(), FALLBACK_REASON))
            .collect(),
        ..Default::default()
    }
}

fn flag_missing_fields(case: &mut ExtractedCase) {
    let missing: Vec<CaseField> = CaseField::REQUIRED
        .into_iter()
        .filter(|field| case.field(*field).is_none())
        .collect();

    if missing.is_empty() {
        return;
    }

    let names: Vec<&str> = missing.iter().map(CaseField::as_str).collect();
    case.append_note(&format!(
        "Missing or uncertain fields: {}. Added for manual review.",
        names.join(", ")
    ));
    for field in missing {
        case.confidence_levels.entry(field).or_insert(ConfidenceLevel::Low);
    }
}

/// Keep one classification per email attachment, in the oracle's order,
/// then append the attachments it skipped
fn reconcile(
    returned: Vec<AttachmentClassification>,
    email: &RawEmail,
) -> Vec<AttachmentClassification> {
    let mut kept: Vec<AttachmentClassification> = Vec::with_capacity(returned.len());

    for mut classification in returned {
        if classification.filename.trim().is_empty() {
            continue;
        }
        let Some(attachment) = email.find_attachment(&classification.filename) else {
            debug!("Dropping classification for unknown file '{}'", classification.filename);
            continue;
        };
        if kept.iter().any(|c| c.filename == attachment.filename) {
            debug!("Dropping duplicate classification for '{}'", attachment.filename);
            continue;
        }
        classification.filename = attachment.filename.clone();
        kept.push(classification);
    }

    for attachment in email.retained_attachments() {
        if !kept.iter().any(|c| c.filename == attachment.filename) {
            kept.push(AttachmentClassification::other(
                attachment.filename.clone(),
                NOT_CATEGORIZED_REASON,
            ));
        }
    }

    kept
}
