//! Parse oracle output into case drafts and attachment facts
//!
//! Oracle output is heterogeneous: scalars arrive as numbers, lists arrive as
//! single strings, provider names arrive as objects. Everything is coerced
//! here, in one place, with a fixed order:
//! string passthrough → object field extraction → stringified fallback.

use serde_json::{Map, Value};
use tracing::warn;
use triage_domain::{
    AttachmentCategory, AttachmentClassification, CaseField, ConfidenceLevel, ExtractedAttachmentFacts,
    ExtractedCase,
};

/// Reason given to an "Other" classification that arrived without one
pub const MISSING_REASON: &str = "No reason provided";

/// A case draft straight from the oracle, before policy is applied
#[derive(Debug, Clone)]
pub struct ParsedCase {
    /// Scalars, notes and confidence; classifications left empty
    pub case: ExtractedCase,
    /// Classifications as returned; `None` when the oracle gave none
    pub classifications: Option<Vec<AttachmentClassification>>,
}

/// Parse a case-level oracle response
///
/// Returns an error when the response does not have the expected shape (a
/// scalar field holding a list or object, a non-array attachment list, a
/// non-object confidence map).
pub fn parse_case_response(json: &Map<String, Value>) -> Result<ParsedCase, String> {
    let mut case = ExtractedCase::default();

    for field in CaseField::ALL {
        *case.field_mut(field) = scalar_field(json, field.as_str())?;
    }
    case.uncertainty_notes = scalar_field(json, "uncertaintyNotes")?;

    match json.get("confidenceLevels") {
        None | Some(Value::Null) => {}
        Some(Value::Object(levels)) => {
            for (key, value) in levels {
                let field = CaseField::parse(key);
                let level = value.as_str().and_then(ConfidenceLevel::parse);
                match (field, level) {
                    (Some(field), Some(level)) => {
                        case.confidence_levels.insert(field, level);
                    }
                    _ => warn!("Ignoring confidence entry {}: {}", key, value),
                }
            }
        }
        Some(other) => {
            return Err(format!("'confidenceLevels' is not an object: {}", other));
        }
    }

    let classifications = match json.get("attachments") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items.iter().map(parse_classification).collect()),
        Some(other) => {
            return Err(format!("'attachments' is not an array: {}", other));
        }
    };

    Ok(ParsedCase {
        case,
        classifications,
    })
}

/// Parse one classification entry
///
/// Malformed entries come back with an empty filename so the case policy
/// drops them along with other filename-less noise.
fn parse_classification(json: &Value) -> AttachmentClassification {
    let Some(obj) = json.as_object() else {
        warn!("Classification entry is not an object: {}", json);
        return AttachmentClassification::other("", MISSING_REASON);
    };

    let filename = obj
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let reason = obj.get("reason").and_then(coerce_text);

    let raw_category = obj.get("category").and_then(Value::as_str).unwrap_or_default();
    match AttachmentCategory::parse(raw_category) {
        Some(AttachmentCategory::Other) | None if raw_category.trim().is_empty() => {
            AttachmentClassification::other(filename, reason.unwrap_or_else(|| MISSING_REASON.to_string()))
        }
        // Other keeps whatever reason the oracle gave
        Some(AttachmentCategory::Other) => {
            AttachmentClassification::other(filename, reason.unwrap_or_else(|| MISSING_REASON.to_string()))
        }
        Some(category) => AttachmentClassification::new(filename, category),
        None => AttachmentClassification::other(
            filename,
            format!("Unrecognized category: {}", raw_category.trim()),
        ),
    }
}

/// Parse an attachment-level oracle response into normalized facts
pub fn parse_attachment_facts(json: &Map<String, Value>) -> ExtractedAttachmentFacts {
    ExtractedAttachmentFacts {
        key_dates: string_list(json.get("keyDates"), coerce_text),
        healthcare_providers: string_list(json.get("healthcareProviders"), coerce_provider),
        diagnoses: string_list(json.get("diagnoses"), coerce_text),
        treatment_history: json.get("treatmentHistory").and_then(coerce_text),
        case_relevant_info: json.get("caseRelevantInfo").and_then(coerce_text),
    }
}

/// A scalar case field: strings pass through, numbers and booleans are
/// rendered, blanks become unset, lists and objects are a shape mismatch
fn scalar_field(json: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match json.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(format!("'{}' is not a scalar: {}", key, other)),
    }
}

/// Coerce any JSON value to text; `None` for null and blanks
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => non_blank(s),
        other => Some(other.to_string()),
    }
}

/// Coerce a provider entry to a plain name
///
/// Objects yield their `name`, then their `provider` field, then their JSON
/// rendering.
pub fn coerce_provider(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => ["name", "provider"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str).and_then(non_blank))
            .or_else(|| Some(value.to_string())),
        other => coerce_text(other),
    }
}

/// A list field: arrays are coerced element-wise, a lone value becomes a
/// one-element list; blanks are dropped and duplicates collapsed in order
fn string_list(value: Option<&Value>, coerce: fn(&Value) -> Option<String>) -> Option<Vec<String>> {
    let items: Vec<&Value> = match value? {
        Value::Null => return None,
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Some(text) = coerce(item) {
            if !out.contains(&text) {
                out.push(text);
            }
        }
    }
    Some(out)
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_full_case() {
        let parsed = parse_case_response(&obj(json!({
            "patientName": "Sarah Johnson",
            "caseNumber": "IM-2025-0456",
            "examDate": "2025-05-15",
            "examType": "Orthopedic IME",
            "referringParty": "Premium Law Firm",
            "location": "Los Angeles, California",
            "uncertaintyNotes": null,
            "confidenceLevels": {"patientName": "high", "examDate": "Medium"},
            "attachments": [
                {"filename": "records.pdf", "category": "Medical Records", "reason": null}
            ]
        })))
        .unwrap();

        assert_eq!(parsed.case.patient_name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(parsed.case.location.as_deref(), Some("Los Angeles, California"));
        assert_eq!(parsed.case.confidence(CaseField::ExamDate), Some(ConfidenceLevel::Medium));
        let classifications = parsed.classifications.unwrap();
        assert_eq!(classifications[0].category, AttachmentCategory::MedicalRecords);
        assert_eq!(classifications[0].reason, None);
    }

    #[test]
    fn test_blank_and_numeric_scalars() {
        let parsed = parse_case_response(&obj(json!({
            "patientName": "   ",
            "caseNumber": 12345
        })))
        .unwrap();
        assert_eq!(parsed.case.patient_name, None);
        assert_eq!(parsed.case.case_number.as_deref(), Some("12345"));
        assert!(parsed.classifications.is_none());
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        assert!(parse_case_response(&obj(json!({"patientName": ["a", "b"]}))).is_err());
        assert!(parse_case_response(&obj(json!({"attachments": "records.pdf"}))).is_err());
        assert!(parse_case_response(&obj(json!({"confidenceLevels": "high"}))).is_err());
    }

    #[test]
    fn test_unknown_confidence_entries_dropped() {
        let parsed = parse_case_response(&obj(json!({
            "confidenceLevels": {"dateOfBirth": "high", "caseNumber": "certain", "location": "low"}
        })))
        .unwrap();
        assert_eq!(parsed.case.confidence_levels.len(), 1);
        assert_eq!(parsed.case.confidence(CaseField::Location), Some(ConfidenceLevel::Low));
    }

    #[test]
    fn test_classification_reason_rules() {
        let parsed = parse_case_response(&obj(json!({
            "attachments": [
                {"filename": "a.pdf", "category": "Declarations", "reason": "sworn"},
                {"filename": "b.pdf", "category": "Other"},
                {"filename": "c.pdf", "category": "Invoices"},
                "not-an-object"
            ]
        })))
        .unwrap();
        let c = parsed.classifications.unwrap();

        assert_eq!(c[0].reason, None);
        assert_eq!(c[1].reason.as_deref(), Some(MISSING_REASON));
        assert_eq!(c[2].category, AttachmentCategory::Other);
        assert_eq!(c[2].reason.as_deref(), Some("Unrecognized category: Invoices"));
        assert_eq!(c[3].filename, "");
    }

    #[test]
    fn test_provider_normalization() {
        let facts = parse_attachment_facts(&obj(json!({
            "healthcareProviders": [{"name": "Dr. X"}, "City Hospital", {}]
        })));
        assert_eq!(
            facts.healthcare_providers.unwrap(),
            vec!["Dr. X".to_string(), "City Hospital".to_string(), "{}".to_string()]
        );
    }

    #[test]
    fn test_provider_field_fallbacks() {
        let facts = parse_attachment_facts(&obj(json!({
            "healthcareProviders": [
                {"name": "", "provider": "Valley Imaging"},
                {"facility": "General"},
                "   ",
                null,
                42
            ]
        })));
        assert_eq!(
            facts.healthcare_providers.unwrap(),
            vec![
                "Valley Imaging".to_string(),
                r#"{"facility":"General"}"#.to_string(),
                "42".to_string()
            ]
        );
    }

    #[test]
    fn test_dates_and_diagnoses_coerced_to_strings() {
        let facts = parse_attachment_facts(&obj(json!({
            "keyDates": ["2024-02-10", 2024, "2024-02-10"],
            "diagnoses": "Cervical strain",
            "treatmentHistory": "Physical therapy twice weekly",
            "caseRelevantInfo": null
        })));
        assert_eq!(facts.key_dates.unwrap(), vec!["2024-02-10".to_string(), "2024".to_string()]);
        assert_eq!(facts.diagnoses.unwrap(), vec!["Cervical strain".to_string()]);
        assert_eq!(facts.treatment_history.as_deref(), Some("Physical therapy twice weekly"));
        assert_eq!(facts.case_relevant_info, None);
    }

    #[test]
    fn test_empty_object_gives_empty_facts() {
        let facts = parse_attachment_facts(&Map::new());
        assert!(facts.is_empty());
        assert_eq!(facts.key_dates, None);
    }
}
