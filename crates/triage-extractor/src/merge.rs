//! Fold attachment facts back into the case record

use triage_domain::{AttachmentFactsMap, ExtractedCase};

/// Year markers that make a key date a plausible exam date
const EXAM_YEARS: [&str; 3] = ["2024", "2025", "2026"];

/// Enrich a case with facts gathered from its attachments
///
/// Only fills gaps: a missing exam date takes the first key date that
/// mentions a recent year, scanning attachments in order and each date list
/// in order. Values the case already has are never replaced.
pub fn merge(mut case: ExtractedCase, facts: &AttachmentFactsMap) -> ExtractedCase {
    if case.exam_date.is_none() {
        case.exam_date = facts
            .iter()
            .filter_map(|(_, facts)| facts)
            .flat_map(|facts| facts.key_dates())
            .find(|date| EXAM_YEARS.iter().any(|year| date.contains(year)))
            .cloned();
    }

    case
}
