//! End-to-end intake: validate, extract, enrich, persist

use crate::config::ExtractorConfig;
use crate::error::IntakeError;
use crate::extractor::Extractor;
use crate::merge::merge;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use triage_domain::traits::CaseStore;
use triage_domain::{CaseId, CaseWithRelations, ExtractionOracle, RawEmail};

/// Coordinates one email through extraction and into the store
///
/// The store is synchronous; every call runs on a blocking thread while
/// holding the store mutex.
pub struct IntakePipeline<S>
where
    S: CaseStore,
{
    extractor: Extractor,
    store: Arc<Mutex<S>>,
}

impl<S> IntakePipeline<S>
where
    S: CaseStore + Send + 'static,
    S::Error: Display,
{
    /// Create a new pipeline, rejecting an invalid configuration
    pub fn new(
        oracle: Arc<dyn ExtractionOracle>,
        store: S,
        config: ExtractorConfig,
    ) -> Result<Self, IntakeError> {
        config.validate().map_err(IntakeError::Config)?;

        Ok(Self {
            extractor: Extractor::new(oracle, config),
            store: Arc::new(Mutex::new(store)),
        })
    }

    /// The extractor driving this pipeline
    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Process an intake email into a persisted case
    ///
    /// Case extraction runs first; attachment extraction needs its
    /// classifications. Oracle failures degrade silently, so only validation
    /// and persistence errors reach the caller.
    pub async fn process_email(&self, email: RawEmail) -> Result<CaseWithRelations, IntakeError> {
        email.validate()?;

        info!(
            "Processing email '{}' from {} with {} attachments",
            email.subject,
            email.sender,
            email.attachments.len()
        );

        let case = self.extractor.extract_case(&email).await;
        let facts = self.extractor.extract_all_attachment_facts(&email, &case).await;
        let case = merge(case, &facts);

        let id = self
            .with_store(move |store| store.create_case(&email, &case, &facts))
            .await?;

        info!("Created case {}", id);

        self.get_case(id).await
    }

    /// Fetch one case with its emails and attachments
    pub async fn get_case(&self, id: CaseId) -> Result<CaseWithRelations, IntakeError> {
        self.with_store(move |store| store.get_case(id))
            .await?
            .ok_or(IntakeError::NotFound(id))
    }

    /// Every case, newest first
    pub async fn list_cases(&self) -> Result<Vec<CaseWithRelations>, IntakeError> {
        self.with_store(|store| store.list_cases()).await
    }

    /// Delete a case and everything attached to it
    pub async fn delete_case(&self, id: CaseId) -> Result<(), IntakeError> {
        if self.with_store(move |store| store.delete_case(id)).await? {
            info!("Deleted case {}", id);
            Ok(())
        } else {
            Err(IntakeError::NotFound(id))
        }
    }

    /// Run a store operation on a blocking thread
    async fn with_store<T, F>(&self, op: F) -> Result<T, IntakeError>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> Result<T, S::Error> + Send + 'static,
    {
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || {
            let mut guard = store
                .lock()
                .map_err(|e| IntakeError::Persistence(format!("Store lock error: {}", e)))?;
            op(&mut *guard).map_err(|e| {
                error!("Store operation failed: {}", e);
                IntakeError::Persistence(e.to_string())
            })
        })
        .await
        .map_err(|e| IntakeError::Persistence(format!("Task join error: {}", e)))?
    }
}
