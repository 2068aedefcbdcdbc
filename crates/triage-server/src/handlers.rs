//! HTTP request handlers for the intake service.
//!
//! Implements email intake, case retrieval and health check endpoints using
//! axum.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;
use triage_domain::{CaseId, CaseWithRelations, RawEmail};
use triage_extractor::{IntakeError, IntakePipeline};
use triage_store::SqliteStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Intake pipeline over the SQLite store
    pub pipeline: Arc<IntakePipeline<SqliteStore>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Current time, RFC 3339
    pub timestamp: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error summary
    pub error: String,
    /// Underlying cause, for server-side failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Pipeline error
    Intake(IntakeError),
    /// Request body is not a usable email
    BadRequest(String),
    /// Path segment is not a case id
    InvalidId(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Intake(IntakeError::Validation(e)) => (StatusCode::BAD_REQUEST, e.to_string(), None),
            AppError::Intake(e @ IntakeError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string(), None),
            AppError::Intake(e) => {
                error!("Request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process request".to_string(),
                    Some(e.to_string()),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::InvalidId(raw) => (StatusCode::BAD_REQUEST, "Invalid case ID".to_string(), Some(raw)),
        };

        let body = Json(ErrorResponse { error, message });
        (status, body).into_response()
    }
}

impl From<IntakeError> for AppError {
    fn from(e: IntakeError) -> Self {
        AppError::Intake(e)
    }
}

fn parse_id(raw: &str) -> Result<CaseId, AppError> {
    raw.parse().map_err(|_| AppError::InvalidId(raw.to_string()))
}

/// POST /api/emails - Process an intake email into a case
async fn process_email(
    State(state): State<AppState>,
    payload: Result<Json<RawEmail>, JsonRejection>,
) -> Result<(StatusCode, Json<CaseWithRelations>), AppError> {
    let Json(email) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let record = state.pipeline.process_email(email).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/cases - Every case, newest first
async fn list_cases(State(state): State<AppState>) -> Result<Json<Vec<CaseWithRelations>>, AppError> {
    Ok(Json(state.pipeline.list_cases().await?))
}

/// GET /api/cases/:id - One case with its emails and attachments
async fn get_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CaseWithRelations>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.pipeline.get_case(id).await?))
}

/// DELETE /api/cases/:id - Remove a case and everything attached to it
async fn delete_case(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.pipeline.delete_case(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/emails", post(process_email))
        .route("/api/cases", get(list_cases))
        .route("/api/cases/:id", get(get_case).delete(delete_case))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
