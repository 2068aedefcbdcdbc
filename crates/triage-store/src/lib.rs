//! Triage Storage Layer
//!
//! Implements the CaseStore trait using SQLite.
//!
//! # Architecture
//!
//! - `cases`, `emails` and `attachments` tables; children cascade on delete
//! - One transaction per created case, so a failed insert leaves nothing behind
//! - Recipients and attachment facts stored as JSON text
//!
//! # Examples
//!
//! ```no_run
//! use triage_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for case operations
//! ```

#![warn(missing_docs)]

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use triage_domain::traits::CaseStore;
use triage_domain::{
    AttachmentFactsMap, CaseId, CaseWithRelations, ExtractedAttachmentFacts, ExtractedCase,
    PersistedAttachment, PersistedCase, PersistedEmail, RawEmail,
};

/// Characters of original attachment content kept as the preview
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored JSON column could not be read back
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A value could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// SQLite-based implementation of CaseStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store behind a mutex or
/// give each thread its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
    preview_chars: usize,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use triage_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("data/triage.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self {
            conn,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Override how many characters of attachment content are previewed
    pub fn with_preview_chars(mut self, preview_chars: usize) -> Self {
        self.preview_chars = preview_chars;
        self
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    fn preview(&self, content: &str) -> String {
        content.chars().take(self.preview_chars).collect()
    }

    fn load_relations(&self, case: PersistedCase) -> Result<CaseWithRelations, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, subject, sender, recipients, body, received_at
             FROM emails WHERE case_id = ?1 ORDER BY id",
        )?;
        let emails = stmt
            .query_map(params![case.id.value()], email_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, filename, category, content_preview, attachment_data, created_at
             FROM attachments WHERE case_id = ?1 ORDER BY id",
        )?;
        let attachments = stmt
            .query_map(params![case.id.value()], attachment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CaseWithRelations {
            case,
            emails,
            attachments,
        })
    }
}

const CASE_COLUMNS: &str = "id, patient_name, case_number, exam_date, exam_type, referring_party, \
     location, uncertainty_notes, created_at, updated_at";

fn case_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedCase> {
    Ok(PersistedCase {
        id: CaseId::from_value(row.get(0)?),
        patient_name: row.get(1)?,
        case_number: row.get(2)?,
        exam_date: row.get(3)?,
        exam_type: row.get(4)?,
        referring_party: row.get(5)?,
        location: row.get(6)?,
        uncertainty_notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn email_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedEmail> {
    let recipients_json: String = row.get(4)?;
    let recipients: Vec<String> = serde_json::from_str(&recipients_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(format!("recipients: {}", e))),
        )
    })?;

    Ok(PersistedEmail {
        id: row.get(0)?,
        case_id: CaseId::from_value(row.get(1)?),
        subject: row.get(2)?,
        sender: row.get(3)?,
        recipients,
        body: row.get(5)?,
        received_at: row.get(6)?,
    })
}

fn attachment_from_row(row: &Row<'_>) -> rusqlite::Result<PersistedAttachment> {
    let data_json: Option<String> = row.get(5)?;
    let attachment_data = data_json
        .map(|json| serde_json::from_str::<ExtractedAttachmentFacts>(&json))
        .transpose()
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                Box::new(StoreError::InvalidData(format!("attachment_data: {}", e))),
            )
        })?;

    Ok(PersistedAttachment {
        id: row.get(0)?,
        case_id: CaseId::from_value(row.get(1)?),
        filename: row.get(2)?,
        category: row.get(3)?,
        content_preview: row.get(4)?,
        attachment_data,
        created_at: row.get(6)?,
    })
}

impl CaseStore for SqliteStore {
    type Error = StoreError;

    fn create_case(
        &mut self,
        email: &RawEmail,
        case: &ExtractedCase,
        facts: &AttachmentFactsMap,
    ) -> Result<CaseId, Self::Error> {
        let recipients = serde_json::to_string(&email.recipients)?;

        // Encode everything up front so the transaction only does inserts
        let mut attachment_rows = Vec::with_capacity(case.attachment_classifications.len());
        for classification in &case.attachment_classifications {
            // Classifications already carry the email's own filenames
            let preview = email
                .retained_attachments()
                .find(|att| att.filename == classification.filename)
                .map(|att| self.preview(&att.content));
            let data = facts
                .get(&classification.filename)
                .map(serde_json::to_string)
                .transpose()?;
            attachment_rows.push((
                classification.filename.as_str(),
                classification.category.as_str(),
                preview,
                data,
            ));
        }

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO cases (patient_name, case_number, exam_date, exam_type, referring_party, location, uncertainty_notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &case.patient_name,
                &case.case_number,
                &case.exam_date,
                &case.exam_type,
                &case.referring_party,
                &case.location,
                &case.uncertainty_notes,
            ],
        )?;
        let case_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO emails (case_id, subject, sender, recipients, body)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![case_id, &email.subject, &email.sender, &recipients, &email.body],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO attachments (case_id, filename, category, content_preview, attachment_data)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (filename, category, preview, data) in &attachment_rows {
                stmt.execute(params![case_id, filename, category, preview, data])?;
            }
        }

        tx.commit()?;

        debug!(
            "Stored case {} with {} attachments",
            case_id,
            attachment_rows.len()
        );

        Ok(CaseId::from_value(case_id))
    }

    fn get_case(&self, id: CaseId) -> Result<Option<CaseWithRelations>, Self::Error> {
        let case = self
            .conn
            .query_row(
                &format!("SELECT {} FROM cases WHERE id = ?1", CASE_COLUMNS),
                params![id.value()],
                case_from_row,
            )
            .optional()?;

        case.map(|case| self.load_relations(case)).transpose()
    }

    fn list_cases(&self) -> Result<Vec<CaseWithRelations>, Self::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM cases ORDER BY created_at DESC, id DESC",
            CASE_COLUMNS
        ))?;
        let cases = stmt
            .query_map([], case_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        cases
            .into_iter()
            .map(|case| self.load_relations(case))
            .collect()
    }

    fn delete_case(&mut self, id: CaseId) -> Result<bool, Self::Error> {
        let deleted = self
            .conn
            .execute("DELETE FROM cases WHERE id = ?1", params![id.value()])?;
        Ok(deleted > 0)
    }
}
