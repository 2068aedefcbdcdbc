//! Extracted case module
//!
//! The structured record produced from an intake email, before persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The scalar fields of a case record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseField {
    /// Examinee name
    PatientName,
    /// Referral case number
    CaseNumber,
    /// Examination date, ISO `YYYY-MM-DD` when determinable
    ExamDate,
    /// Examination type (e.g. "Orthopedic IME")
    ExamType,
    /// Referring party or law firm
    ReferringParty,
    /// Examination location
    Location,
}

impl CaseField {
    /// Every case field, in record order
    pub const ALL: [CaseField; 6] = [
        CaseField::PatientName,
        CaseField::CaseNumber,
        CaseField::ExamDate,
        CaseField::ExamType,
        CaseField::ReferringParty,
        CaseField::Location,
    ];

    /// Fields whose absence always needs manual review, in reporting order
    pub const REQUIRED: [CaseField; 4] = [
        CaseField::PatientName,
        CaseField::CaseNumber,
        CaseField::ExamType,
        CaseField::ExamDate,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseField::PatientName => "patientName",
            CaseField::CaseNumber => "caseNumber",
            CaseField::ExamDate => "examDate",
            CaseField::ExamType => "examType",
            CaseField::ReferringParty => "referringParty",
            CaseField::Location => "location",
        }
    }

    /// Parse a wire name
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

impl fmt::Display for CaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse reliability tag attached to an extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Stated plainly in the source
    High,
    /// Some hedging or inference involved
    Medium,
    /// Highly uncertain or missing
    Low,
}

impl ConfidenceLevel {
    /// Parse a level, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Some(ConfidenceLevel::High),
            "medium" => Some(ConfidenceLevel::Medium),
            "low" => Some(ConfidenceLevel::Low),
            _ => None,
        }
    }
}

/// Document category assigned to an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentCategory {
    /// Medical history, treatment notes, diagnostic reports
    #[serde(rename = "Medical Records")]
    MedicalRecords,
    /// Sworn statements, declarations, affidavits
    #[serde(rename = "Declarations")]
    Declarations,
    /// Introductory or transmittal letters
    #[serde(rename = "Cover Letters")]
    CoverLetters,
    /// Could not be categorized; always carries a reason
    #[serde(rename = "Other")]
    Other,
}

impl AttachmentCategory {
    /// Display and storage name
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentCategory::MedicalRecords => "Medical Records",
            AttachmentCategory::Declarations => "Declarations",
            AttachmentCategory::CoverLetters => "Cover Letters",
            AttachmentCategory::Other => "Other",
        }
    }

    /// Parse a category name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        [
            AttachmentCategory::MedicalRecords,
            AttachmentCategory::Declarations,
            AttachmentCategory::CoverLetters,
            AttachmentCategory::Other,
        ]
        .into_iter()
        .find(|c| c.as_str().to_ascii_lowercase() == lowered)
    }
}

impl fmt::Display for AttachmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category assignment for one attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentClassification {
    /// Attachment filename
    pub filename: String,
    /// Assigned category
    pub category: AttachmentCategory,
    /// Why the attachment is "Other"; unset for every other category
    pub reason: Option<String>,
}

impl AttachmentClassification {
    /// Classify into a definite category
    pub fn new(filename: impl Into<String>, category: AttachmentCategory) -> Self {
        Self {
            filename: filename.into(),
            category,
            reason: None,
        }
    }

    /// Classify as "Other" with an explanation
    pub fn other(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            category: AttachmentCategory::Other,
            reason: Some(reason.into()),
        }
    }
}

/// Structured case record produced by extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCase {
    /// Examinee name
    pub patient_name: Option<String>,
    /// Referral case number
    pub case_number: Option<String>,
    /// Examination date
    pub exam_date: Option<String>,
    /// Examination type
    pub exam_type: Option<String>,
    /// Referring party or law firm
    pub referring_party: Option<String>,
    /// Examination location
    pub location: Option<String>,
    /// Every uncertainty explanation, accumulated
    pub uncertainty_notes: Option<String>,
    /// Per-field confidence
    pub confidence_levels: BTreeMap<CaseField, ConfidenceLevel>,
    /// One entry per retained attachment
    pub attachment_classifications: Vec<AttachmentClassification>,
}

impl ExtractedCase {
    /// Current value of a scalar field
    pub fn field(&self, field: CaseField) -> Option<&str> {
        match field {
            CaseField::PatientName => self.patient_name.as_deref(),
            CaseField::CaseNumber => self.case_number.as_deref(),
            CaseField::ExamDate => self.exam_date.as_deref(),
            CaseField::ExamType => self.exam_type.as_deref(),
            CaseField::ReferringParty => self.referring_party.as_deref(),
            CaseField::Location => self.location.as_deref(),
        }
    }

    /// Mutable slot of a scalar field
    pub fn field_mut(&mut self, field: CaseField) -> &mut Option<String> {
        match field {
            CaseField::PatientName => &mut self.patient_name,
            CaseField::CaseNumber => &mut self.case_number,
            CaseField::ExamDate => &mut self.exam_date,
            CaseField::ExamType => &mut self.exam_type,
            CaseField::ReferringParty => &mut self.referring_party,
            CaseField::Location => &mut self.location,
        }
    }

    /// Append a note, joining with a single space
    pub fn append_note(&mut self, note: &str) {
        self.uncertainty_notes = match self.uncertainty_notes.take() {
            Some(existing) if !existing.trim().is_empty() => Some(format!("{} {}", existing, note)),
            _ => Some(note.to_string()),
        };
    }

    /// Confidence recorded for a field, if any
    pub fn confidence(&self, field: CaseField) -> Option<ConfidenceLevel> {
        self.confidence_levels.get(&field).copied()
    }

    /// Classification for a filename, if any
    pub fn classification(&self, filename: &str) -> Option<&AttachmentClassification> {
        self.attachment_classifications
            .iter()
            .find(|c| c.filename == filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_field_round_trip_names() {
        for field in CaseField::ALL {
            assert_eq!(CaseField::parse(field.as_str()), Some(field));
        }
        assert_eq!(CaseField::parse("dateOfBirth"), None);
    }

    #[test]
    fn test_confidence_parse_is_lenient() {
        assert_eq!(ConfidenceLevel::parse("HIGH"), Some(ConfidenceLevel::High));
        assert_eq!(ConfidenceLevel::parse(" medium "), Some(ConfidenceLevel::Medium));
        assert_eq!(ConfidenceLevel::parse("certain"), None);
    }

    #[test]
    fn test_category_wire_names() {
        let json = serde_json::to_string(&AttachmentCategory::MedicalRecords).unwrap();
        assert_eq!(json, "\"Medical Records\"");
        assert_eq!(
            AttachmentCategory::parse("cover letters"),
            Some(AttachmentCategory::CoverLetters)
        );
        assert_eq!(AttachmentCategory::parse("Invoices"), None);
    }

    #[test]
    fn test_append_note() {
        let mut case = ExtractedCase::default();
        case.append_note("first.");
        case.append_note("second.");
        assert_eq!(case.uncertainty_notes.as_deref(), Some("first. second."));
    }

    #[test]
    fn test_confidence_map_serializes_with_field_names() {
        let mut case = ExtractedCase::default();
        case.confidence_levels.insert(CaseField::ExamDate, ConfidenceLevel::Low);

        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["confidenceLevels"]["examDate"], "low");
    }
}
