//! Integration tests for the Extractor and IntakePipeline

#[cfg(test)]
mod tests {
    use crate::{ExtractorConfig, Extractor, IntakeError, IntakePipeline, FALLBACK_NOTE, FALLBACK_REASON};
    use std::sync::Arc;
    use triage_domain::{
        AttachmentCategory, CaseField, ConfidenceLevel, RawAttachment, RawEmail,
    };
    use triage_llm::MockProvider;
    use triage_store::SqliteStore;

    const CASE_RESPONSE: &str = r#"{
        "patientName": "Sarah Johnson",
        "caseNumber": "IM-2025-0456",
        "examDate": null,
        "examType": "Orthopedic IME",
        "referringParty": "Premium Law Firm",
        "location": "Los Angeles, California",
        "uncertaintyNotes": "Exam date was only hinted at.",
        "confidenceLevels": {"patientName": "high", "examDate": "medium"},
        "attachments": [
            {"filename": "medical_records.pdf", "category": "Medical Records", "reason": null},
            {"filename": "declaration.pdf", "category": "Declarations", "reason": null}
        ]
    }"#;

    fn referral_email() -> RawEmail {
        RawEmail {
            subject: "IME Referral - Case #IM-2025-0456".to_string(),
            sender: "referrals@premiumlaw.com".to_string(),
            recipients: vec!["intake@imecenter.com".to_string()],
            body: "Please schedule an Orthopedic IME for Sarah Johnson, possibly mid-May.".to_string(),
            attachments: vec![
                RawAttachment::new("medical_records.pdf", "MEDICAL RECORDS\nVisit 1999-01-01, follow-up 2024-03-01"),
                RawAttachment::new("declaration.pdf", "DECLARATION OF SARAH JOHNSON"),
                RawAttachment::new("misc.txt", "Parking instructions"),
            ],
        }
    }

    fn mock_oracle() -> MockProvider {
        let oracle = MockProvider::new("{}");
        oracle.add_response("Filename: medical_records.pdf", r#"{
            "keyDates": ["1999-01-01", "2024-03-01", "2025-06-01"],
            "healthcareProviders": [{"name": "Dr. X"}, "City Hospital", {}],
            "diagnoses": ["Cervical strain"]
        }"#);
        oracle.add_error("Filename: declaration.pdf");
        oracle.add_response("Subject:", CASE_RESPONSE);
        oracle
    }

    fn pipeline(oracle: MockProvider) -> IntakePipeline<SqliteStore> {
        let store = SqliteStore::new(":memory:").unwrap();
        IntakePipeline::new(Arc::new(oracle), store, ExtractorConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_full_intake_flow() {
        let oracle = mock_oracle();
        let pipeline = pipeline(oracle.clone());

        let record = pipeline.process_email(referral_email()).await.unwrap();

        // One case call plus one call per attachment
        assert_eq!(oracle.call_count(), 4);

        assert_eq!(record.case.patient_name.as_deref(), Some("Sarah Johnson"));
        assert_eq!(record.case.location.as_deref(), Some("Los Angeles, California"));
        // Filled from the first recent key date of the first attachment
        assert_eq!(record.case.exam_date.as_deref(), Some("2024-03-01"));
        assert_eq!(
            record.case.uncertainty_notes.as_deref(),
            Some("Exam date was only hinted at. Missing or uncertain fields: examDate. Added for manual review.")
        );

        assert_eq!(record.emails.len(), 1);
        assert_eq!(record.emails[0].recipients, vec!["intake@imecenter.com".to_string()]);

        let names: Vec<&str> = record.attachments.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["medical_records.pdf", "declaration.pdf", "misc.txt"]);

        let records = &record.attachments[0];
        assert_eq!(records.category, "Medical Records");
        let facts = records.attachment_data.as_ref().unwrap();
        assert_eq!(
            facts.healthcare_providers,
            Some(vec!["Dr. X".to_string(), "City Hospital".to_string(), "{}".to_string()])
        );

        // Failed attachment extraction stores no facts
        assert_eq!(record.attachments[1].attachment_data, None);
        assert_eq!(record.attachments[2].category, "Other");
        assert_eq!(
            record.attachments[2].content_preview.as_deref(),
            Some("Parking instructions")
        );
    }

    #[tokio::test]
    async fn test_classifications_cover_every_attachment() {
        let extractor = Extractor::new(Arc::new(mock_oracle()), ExtractorConfig::default());
        let email = referral_email();

        let case = extractor.extract_case(&email).await;

        assert_eq!(case.attachment_classifications.len(), email.attachments.len());
        for attachment in &email.attachments {
            assert!(case.classification(&attachment.filename).is_some());
        }
        let misc = case.classification("misc.txt").unwrap();
        assert_eq!(misc.category, AttachmentCategory::Other);
        assert_eq!(misc.reason.as_deref(), Some("Not categorized by LLM"));
    }

    #[tokio::test]
    async fn test_missing_required_fields_get_confidence_floor() {
        let oracle = MockProvider::new(r#"{
            "patientName": "Sarah Johnson",
            "confidenceLevels": {"caseNumber": "high"}
        }"#);
        let extractor = Extractor::new(Arc::new(oracle), ExtractorConfig::default());

        let case = extractor.extract_case(&referral_email()).await;

        for field in [CaseField::ExamType, CaseField::ExamDate] {
            assert_eq!(case.field(field), None);
            assert_eq!(case.confidence(field), Some(ConfidenceLevel::Low));
        }
        // The oracle's own level for a missing field stands
        assert_eq!(case.field(CaseField::CaseNumber), None);
        assert_eq!(case.confidence(CaseField::CaseNumber), Some(ConfidenceLevel::High));
        let notes = case.uncertainty_notes.unwrap();
        assert!(notes.contains("caseNumber, examType, examDate"));
        // No classifications at all: every attachment gets the same reason
        assert!(case
            .attachment_classifications
            .iter()
            .all(|c| c.reason.as_deref() == Some("Unable to categorize from email content")));
    }

    #[tokio::test]
    async fn test_oracle_failure_falls_back() {
        let extractor = Extractor::new(Arc::new(MockProvider::failing()), ExtractorConfig::default());
        let email = referral_email();

        let first = extractor.extract_case(&email).await;
        let second = extractor.extract_case(&email).await;

        assert_eq!(first, second);
        assert_eq!(first.uncertainty_notes.as_deref(), Some(FALLBACK_NOTE));
        assert!(first.confidence_levels.is_empty());
        for field in CaseField::ALL {
            assert_eq!(first.field(field), None);
        }
        assert_eq!(first.attachment_classifications.len(), 3);
        assert!(first
            .attachment_classifications
            .iter()
            .all(|c| c.category == AttachmentCategory::Other && c.reason.as_deref() == Some(FALLBACK_REASON)));
    }

    #[tokio::test]
    async fn test_malformed_response_falls_back() {
        let extractor = Extractor::new(
            Arc::new(MockProvider::new(r#"{"patientName": ["Sarah", "Johnson"]}"#)),
            ExtractorConfig::default(),
        );

        let case = extractor.extract_case(&referral_email()).await;
        assert_eq!(case.uncertainty_notes.as_deref(), Some(FALLBACK_NOTE));
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back() {
        let extractor = Extractor::new(
            Arc::new(MockProvider::new("This is not JSON")),
            ExtractorConfig::default(),
        );

        let case = extractor.extract_case(&referral_email()).await;
        assert_eq!(case.patient_name, None);
        assert_eq!(case.uncertainty_notes.as_deref(), Some(FALLBACK_NOTE));
    }

    #[tokio::test]
    async fn test_pipeline_survives_total_oracle_outage() {
        let pipeline = pipeline(MockProvider::failing());

        let record = pipeline.process_email(referral_email()).await.unwrap();

        assert_eq!(record.case.uncertainty_notes.as_deref(), Some(FALLBACK_NOTE));
        assert_eq!(record.attachments.len(), 3);
        assert!(record.attachments.iter().all(|a| a.attachment_data.is_none()));
    }

    #[tokio::test]
    async fn test_existing_exam_date_not_overwritten() {
        let oracle = MockProvider::new("{}");
        oracle.add_response("Filename: medical_records.pdf", r#"{"keyDates": ["2024-03-01"]}"#);
        oracle.add_response(
            "Subject:",
            r#"{"patientName": "Sarah Johnson", "caseNumber": "IM-2025-0456",
                "examType": "Orthopedic IME", "examDate": "2025-05-15"}"#,
        );

        let record = pipeline(oracle).process_email(referral_email()).await.unwrap();
        assert_eq!(record.case.exam_date.as_deref(), Some("2025-05-15"));
        assert_eq!(record.case.uncertainty_notes, None);
    }

    #[tokio::test]
    async fn test_invalid_email_rejected_before_extraction() {
        let oracle = mock_oracle();
        let pipeline = pipeline(oracle.clone());

        let mut email = referral_email();
        email.sender = "   ".to_string();

        let result = pipeline.process_email(email).await;
        assert!(matches!(result, Err(IntakeError::Validation(_))));
        assert_eq!(oracle.call_count(), 0);
        assert!(pipeline.list_cases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_list_and_delete() {
        let pipeline = pipeline(mock_oracle());

        let first = pipeline.process_email(referral_email()).await.unwrap();
        let second = pipeline.process_email(referral_email()).await.unwrap();

        let fetched = pipeline.get_case(first.case.id).await.unwrap();
        assert_eq!(fetched, first);

        let listed = pipeline.list_cases().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].case.id, second.case.id);

        pipeline.delete_case(first.case.id).await.unwrap();
        assert!(matches!(
            pipeline.get_case(first.case.id).await,
            Err(IntakeError::NotFound(_))
        ));
        assert!(matches!(
            pipeline.delete_case(first.case.id).await,
            Err(IntakeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_attachment_prompt_carries_category() {
        let oracle = mock_oracle();
        let extractor = Extractor::new(Arc::new(oracle.clone()), ExtractorConfig::default());
        let email = referral_email();

        let case = extractor.extract_case(&email).await;
        oracle.reset_call_count();
        extractor.extract_all_attachment_facts(&email, &case).await;

        let calls = oracle.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls
            .iter()
            .any(|(_, user)| user.contains("Filename: declaration.pdf") && user.contains("Category: Declarations")));
    }

    #[tokio::test]
    async fn test_empty_attachment_answer_yields_empty_facts() {
        let extractor = Extractor::new(Arc::new(MockProvider::new("{}")), ExtractorConfig::default());

        let facts = extractor
            .extract_attachment_facts("notes.txt", "nothing here", AttachmentCategory::Other)
            .await;
        assert!(facts.unwrap().is_empty());

        let failing = Extractor::new(Arc::new(MockProvider::failing()), ExtractorConfig::default());
        let facts = failing
            .extract_attachment_facts("notes.txt", "nothing here", AttachmentCategory::Other)
            .await;
        assert!(facts.is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = SqliteStore::new(":memory:").unwrap();
        let config = ExtractorConfig {
            attachment_content_chars: 0,
            ..Default::default()
        };
        let result = IntakePipeline::new(Arc::new(MockProvider::default()), store, config);
        assert!(matches!(result, Err(IntakeError::Config(_))));
    }
}
