//! Attachment facts module
//!
//! Dates, providers and diagnoses mined from a single attachment.

use serde::{Deserialize, Serialize};

/// Facts extracted from one attachment
///
/// An attachment the oracle could not process has no facts at all; that is
/// distinct from a value whose fields are all unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedAttachmentFacts {
    /// Treatment, injury, exam and appointment dates, as written or ISO
    pub key_dates: Option<Vec<String>>,
    /// Provider and facility names, always plain strings
    pub healthcare_providers: Option<Vec<String>>,
    /// Diagnoses or conditions
    pub diagnoses: Option<Vec<String>>,
    /// Summary of treatment history
    pub treatment_history: Option<String>,
    /// Anything else relevant to the case
    pub case_relevant_info: Option<String>,
}

impl ExtractedAttachmentFacts {
    /// Key dates, empty when unset
    pub fn key_dates(&self) -> &[String] {
        self.key_dates.as_deref().unwrap_or(&[])
    }

    /// True when every field is unset or empty
    pub fn is_empty(&self) -> bool {
        self.key_dates().is_empty()
            && self.healthcare_providers.as_ref().map_or(true, Vec::is_empty)
            && self.diagnoses.as_ref().map_or(true, Vec::is_empty)
            && self.treatment_history.is_none()
            && self.case_relevant_info.is_none()
    }
}

/// Facts for each attachment, in declared attachment order
///
/// `None` means no facts were available for that attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentFactsMap {
    entries: Vec<(String, Option<ExtractedAttachmentFacts>)>,
}

impl AttachmentFactsMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for a filename, replacing an earlier entry in place
    pub fn insert(&mut self, filename: impl Into<String>, facts: Option<ExtractedAttachmentFacts>) {
        let filename = filename.into();
        match self.entries.iter_mut().find(|(name, _)| *name == filename) {
            Some(entry) => entry.1 = facts,
            None => self.entries.push((filename, facts)),
        }
    }

    /// Facts for a filename; `None` when absent or never recorded
    pub fn get(&self, filename: &str) -> Option<&ExtractedAttachmentFacts> {
        self.entries
            .iter()
            .find(|(name, _)| name == filename)
            .and_then(|(_, facts)| facts.as_ref())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ExtractedAttachmentFacts>)> {
        self.entries
            .iter()
            .map(|(name, facts)| (name.as_str(), facts.as_ref()))
    }

    /// Number of recorded attachments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Option<ExtractedAttachmentFacts>)> for AttachmentFactsMap {
    fn from_iter<I: IntoIterator<Item = (String, Option<ExtractedAttachmentFacts>)>>(iter: I) -> Self {
        let mut map = AttachmentFactsMap::new();
        for (filename, facts) in iter {
            map.insert(filename, facts);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(dates: &[&str]) -> ExtractedAttachmentFacts {
        ExtractedAttachmentFacts {
            key_dates: Some(dates.iter().map(|d| d.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_map_preserves_order() {
        let map: AttachmentFactsMap = vec![
            ("b.pdf".to_string(), Some(dated(&["2024-01-01"]))),
            ("a.pdf".to_string(), None),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = map.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
        assert!(map.get("a.pdf").is_none());
        assert_eq!(map.get("b.pdf").unwrap().key_dates(), ["2024-01-01"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = AttachmentFactsMap::new();
        map.insert("a.pdf", None);
        map.insert("b.pdf", None);
        map.insert("a.pdf", Some(dated(&["2025-02-02"])));

        assert_eq!(map.len(), 2);
        assert_eq!(map.iter().next().unwrap().0, "a.pdf");
        assert!(map.get("a.pdf").is_some());
    }

    #[test]
    fn test_empty_facts_still_serialize_all_fields() {
        let facts = ExtractedAttachmentFacts::default();
        assert!(facts.is_empty());

        let json = serde_json::to_value(&facts).unwrap();
        assert!(json.get("keyDates").is_some());
        assert!(json["healthcareProviders"].is_null());
    }
}
