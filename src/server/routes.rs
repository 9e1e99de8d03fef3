//! HTTP route handlers for the call analyzer API.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::services::ServeDir;

use crate::storage::{AnalysisRecord, HISTORY_LIMIT, StoreError};
use crate::text::ellipsize;

use super::state::AppState;

/// Minimum transcript length, in characters, after trimming.
pub const MIN_TRANSCRIPT_CHARS: usize = 10;
/// Characters of the transcript echoed back in `transcript_preview`.
pub const PREVIEW_CHARS: usize = 100;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_transcript))
        .route("/history", get(history))
        .fallback_service(static_files)
        .with_state(state)
}

/// Errors returned to HTTP clients as `{"error": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was rejected before analysis.
    #[error("{0}")]
    Validation(String),
    /// The analysis log could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "call-analyzer",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Analysis request.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw call transcript.
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Analysis response.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Always `true`; failures use [`ErrorResponse`].
    pub success: bool,
    /// Summary text, or the remote error message.
    pub summary: String,
    /// Sentiment label, or `error`.
    pub sentiment: String,
    /// First 100 characters of the transcript.
    pub transcript_preview: String,
}

/// Check the trimmed transcript before spending a remote call on it.
///
/// # Errors
/// Returns [`ApiError::Validation`] for empty or too-short transcripts.
pub fn validate_transcript(transcript: &str) -> Result<(), ApiError> {
    if transcript.is_empty() {
        return Err(ApiError::Validation("Transcript cannot be empty".to_string()));
    }
    if transcript.chars().count() < MIN_TRANSCRIPT_CHARS {
        return Err(ApiError::Validation("Transcript is too short".to_string()));
    }
    Ok(())
}

/// Analyze a transcript and append the result to the log.
async fn analyze_transcript(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let raw = request.transcript.unwrap_or_default();
    let transcript = raw.trim();
    validate_transcript(transcript)?;

    let outcome = state.analyzer.analyze(transcript).await;
    state
        .store
        .append(transcript, &outcome.summary, &outcome.sentiment)
        .await?;

    tracing::info!(
        "Analyzed transcript ({} chars), sentiment={}",
        transcript.chars().count(),
        outcome.sentiment
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        transcript_preview: ellipsize(transcript, PREVIEW_CHARS),
        summary: outcome.summary,
        sentiment: outcome.sentiment,
    }))
}

/// History response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Most recent records, oldest first.
    pub history: Vec<AnalysisRecord>,
}

/// Return the most recent analyses.
async fn history(State(state): State<Arc<AppState>>) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.store.read_recent(HISTORY_LIMIT).await?;
    Ok(Json(HistoryResponse { history }))
}
