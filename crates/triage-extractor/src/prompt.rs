//! LLM prompt engineering for case and attachment extraction

use triage_domain::{AttachmentCategory, RawEmail};

/// System prompt for case-level extraction
pub const CASE_EXTRACTION_PROMPT: &str = r#"You extract structured referral data from emails about Independent Medical Examinations (IMEs).

Extract from the email:
- Patient name
- Case number
- Exam date (normalize to ISO YYYY-MM-DD when the date can be determined)
- Exam type (e.g. Orthopedic IME, Neurology IME, Psych IME)
- Referring party or law firm
- Location, if mentioned

Uncertainty:
Watch for hedged language such as "might be", "possibly", "likely", "approximately",
"hoping for", "something close to", "maybe", "probably". When a value is hedged:
- give your best guess for the value
- explain the doubt in uncertaintyNotes
- set its confidence: "high" (certain), "medium" (some doubt), "low" (very doubtful)

Attachments:
Put every attachment in exactly one category:
- Medical Records: medical history, treatment notes, diagnostic reports, test results
- Declarations: sworn statements, declarations, affidavits
- Cover Letters: introductory letters, transmittal letters, cover sheets
- Other: only when no category fits; a reason is then required

Use the filename first ("records", "medical", "chart" suggest Medical Records;
"declaration", "affidavit", "statement" suggest Declarations; "cover", "letter",
"transmittal" suggest Cover Letters), then how the body refers to the attachment,
then the content preview. Reserve "Other" for attachments that truly cannot be placed."#;

/// Output format reminder appended to the case prompt
pub const CASE_OUTPUT_FORMAT: &str = r#"Output format (JSON object only, no additional text):
{
  "patientName": "string or null",
  "caseNumber": "string or null",
  "examDate": "YYYY-MM-DD or null",
  "examType": "string or null",
  "referringParty": "string or null",
  "location": "string or null",
  "uncertaintyNotes": "string or null",
  "confidenceLevels": {
    "patientName": "high" | "medium" | "low",
    "caseNumber": "high" | "medium" | "low",
    "examDate": "high" | "medium" | "low",
    "examType": "high" | "medium" | "low",
    "referringParty": "high" | "medium" | "low",
    "location": "high" | "medium" | "low"
  },
  "attachments": [
    {
      "filename": "string",
      "category": "Medical Records" | "Declarations" | "Cover Letters" | "Other",
      "reason": "string when category is Other, otherwise null"
    }
  ]
}

Use null for anything the email does not contain."#;

/// System prompt for attachment-level extraction
pub const ATTACHMENT_SYSTEM_PROMPT: &str =
    "You extract structured medical and legal information from case documents.";

const ATTACHMENT_INSTRUCTIONS: &str = r#"Extract:
- Key dates (treatment, injury, exam and appointment dates) as an array of strings, YYYY-MM-DD or as written
- Healthcare providers and facilities as an array of plain STRING names
- Diagnoses or medical conditions as an array of strings
- A single-string summary of treatment history
- Any other case-relevant information as a single string

healthcareProviders must contain strings, never objects:
- CORRECT: ["Dr. John Smith", "City Hospital"]
- WRONG: [{"name": "Dr. John Smith"}, {"name": "City Hospital"}]

Output format (JSON object only, no additional text):
{
  "keyDates": ["2024-02-08"] or null,
  "healthcareProviders": ["Dr. John Smith"] or null,
  "diagnoses": ["Cervical strain"] or null,
  "treatmentHistory": "string" or null,
  "caseRelevantInfo": "string" or null
}

Use null for every field when the document holds nothing relevant."#;

/// Full system prompt sent for case extraction
pub fn case_system_prompt() -> String {
    format!("{}\n\n{}", CASE_EXTRACTION_PROMPT, CASE_OUTPUT_FORMAT)
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds the combined text corpus for case extraction
pub struct CaseCorpusBuilder<'a> {
    email: &'a RawEmail,
    attachment_chars: usize,
}

impl<'a> CaseCorpusBuilder<'a> {
    /// Create a new corpus builder
    pub fn new(email: &'a RawEmail, attachment_chars: usize) -> Self {
        Self {
            email,
            attachment_chars,
        }
    }

    /// Subject, sender, body, then each retained attachment's filename and
    /// leading content, blank-line separated in declared order
    pub fn build(&self) -> String {
        let mut corpus = String::new();

        corpus.push_str(&format!("Subject: {}\n", self.email.subject));
        corpus.push_str(&format!("From: {}\n", self.email.sender));
        corpus.push_str("Body:\n");
        corpus.push_str(&self.email.body);
        corpus.push_str("\n\nAttachments:\n");

        let sections: Vec<String> = self
            .email
            .retained_attachments()
            .map(|att| {
                format!(
                    "- {}: {}",
                    att.filename,
                    truncate_chars(&att.content, self.attachment_chars)
                )
            })
            .collect();

        if sections.is_empty() {
            corpus.push_str("None");
        } else {
            corpus.push_str(&sections.join("\n\n"));
        }
        corpus.push('\n');

        corpus
    }
}

/// Builds the user prompt for a single attachment
pub struct AttachmentPromptBuilder<'a> {
    filename: &'a str,
    category: AttachmentCategory,
    content: &'a str,
    content_chars: usize,
}

impl<'a> AttachmentPromptBuilder<'a> {
    /// Create a new attachment prompt builder
    pub fn new(
        filename: &'a str,
        category: AttachmentCategory,
        content: &'a str,
        content_chars: usize,
    ) -> Self {
        Self {
            filename,
            category,
            content,
            content_chars,
        }
    }

    /// Build the complete attachment prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are analyzing a {} attachment for an IME case.\n\n",
            self.category
        ));
        prompt.push_str(&format!("Filename: {}\n", self.filename));
        prompt.push_str(&format!("Category: {}\n\n", self.category));

        prompt.push_str("Attachment content:\n");
        prompt.push_str("---\n");
        prompt.push_str(truncate_chars(self.content, self.content_chars));
        prompt.push_str("\n---\n\n");

        prompt.push_str(ATTACHMENT_INSTRUCTIONS);

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_domain::RawAttachment;

    fn email_with(attachments: Vec<RawAttachment>) -> RawEmail {
        RawEmail {
            subject: "IME Referral - Case #IM-2025-0456".to_string(),
            sender: "referrals@premiumlaw.com".to_string(),
            recipients: vec![],
            body: "Please schedule an Orthopedic IME.".to_string(),
            attachments,
        }
    }

    #[test]
    fn test_truncate_chars_is_char_based() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_corpus_includes_headers_and_body() {
        let corpus = CaseCorpusBuilder::new(&email_with(vec![]), 1000).build();
        assert!(corpus.starts_with("Subject: IME Referral - Case #IM-2025-0456\n"));
        assert!(corpus.contains("From: referrals@premiumlaw.com"));
        assert!(corpus.contains("Please schedule an Orthopedic IME."));
        assert!(corpus.contains("Attachments:\nNone"));
    }

    #[test]
    fn test_corpus_truncates_attachments_in_order() {
        let email = email_with(vec![
            RawAttachment::new("first.pdf", "a".repeat(1500)),
            RawAttachment::new("   ", "skipped"),
            RawAttachment::new("second.pdf", "short"),
        ]);
        let corpus = CaseCorpusBuilder::new(&email, 1000).build();

        let first = corpus.find("- first.pdf: ").unwrap();
        let second = corpus.find("- second.pdf: short").unwrap();
        assert!(first < second);
        assert!(corpus.contains(&"a".repeat(1000)));
        assert!(!corpus.contains(&"a".repeat(1001)));
        assert!(!corpus.contains("skipped"));
    }

    #[test]
    fn test_attachment_prompt_truncates_content() {
        let content = format!("{}TAIL", "x".repeat(4000));
        let prompt = AttachmentPromptBuilder::new(
            "records.pdf",
            AttachmentCategory::MedicalRecords,
            &content,
            4000,
        )
        .build();

        assert!(prompt.contains("Filename: records.pdf"));
        assert!(prompt.contains("Category: Medical Records"));
        assert!(!prompt.contains("TAIL"));
    }

    #[test]
    fn test_case_prompt_mentions_every_category() {
        let prompt = case_system_prompt();
        for category in ["Medical Records", "Declarations", "Cover Letters", "Other"] {
            assert!(prompt.contains(category));
        }
        assert!(prompt.contains("confidenceLevels"));
    }
}
