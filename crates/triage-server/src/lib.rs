//! Triage Server
//!
//! HTTP front end for the intake pipeline: accepts intake emails and serves
//! the resulting cases.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod samples;

use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use triage_extractor::{IntakeError, IntakePipeline};
use triage_llm::OpenAiProvider;
use triage_store::{SqliteStore, StoreError};

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Database could not be opened
    #[error("Failed to open database: {0}")]
    Store(#[from] StoreError),

    /// Oracle client could not be built
    #[error("Failed to create oracle client: {0}")]
    Oracle(String),

    /// Pipeline could not be assembled
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] IntakeError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state from configuration
///
/// Opens (and creates, if needed) the database and constructs the oracle
/// client once for the lifetime of the process.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteStore::new(&config.database_path)?;

    let oracle = OpenAiProvider::new(
        config.oracle.base_url.clone(),
        config.oracle.model.clone(),
        config.oracle.api_key.clone(),
        config.oracle.timeout(),
    )
    .map_err(|e| ServerError::Oracle(e.to_string()))?;

    if !oracle.is_configured() {
        warn!("OPENAI_API_KEY is not set; every case will use fallback extraction");
    }

    let pipeline = IntakePipeline::new(Arc::new(oracle), store, config.extractor.clone())?;

    Ok(AppState {
        pipeline: Arc::new(pipeline),
    })
}

/// Start the HTTP server
///
/// Builds the application state and serves until the process exits.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Triage server");
    info!("Database: {}", config.database_path.display());
    info!("Oracle model: {}", config.oracle.model);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());
    info!("  POST   /api/emails     - Process an intake email");
    info!("  GET    /api/cases      - List cases");
    info!("  GET    /api/cases/:id  - Get case by ID");
    info!("  DELETE /api/cases/:id  - Delete case");

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_creates_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            database_path: dir.path().join("nested").join("triage.db"),
            ..Default::default()
        };

        assert!(build_state(&config).is_ok());
        assert!(dir.path().join("nested").join("triage.db").exists());
    }
}
