//! Focus capture endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::types::{
    AnalyzeResponse, CaptureRequest, CaptureResponse, CapturesResponse, DeleteSessionResponse,
    SessionsResponse,
};
use super::AppState;
use crate::focus::{analyze_session, record_capture, FocusError, NewCapture};

/// Map a focus error to a response, prefixing server errors with `context`.
fn error_response(context: &str, err: FocusError) -> (StatusCode, String) {
    match err {
        FocusError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        FocusError::NoCaptures => (StatusCode::BAD_REQUEST, err.to_string()),
        other => {
            tracing::error!("{}: {}", context, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{}: {}", context, other),
            )
        }
    }
}

/// Store a capture, opening a new session on a detected topic shift.
pub async fn capture(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CaptureRequest>,
) -> Result<Json<CaptureResponse>, (StatusCode, String)> {
    let new_capture = NewCapture {
        selected_text: req.selected_text,
        page_url: req.page_url,
        page_title: req.page_title,
    };

    let receipt = record_capture(
        &state.store,
        &state.boundary,
        state.text_model.as_deref(),
        &state.capture_lock,
        &new_capture,
    )
    .await
    .map_err(|e| error_response("Failed to capture", e))?;

    Ok(Json(CaptureResponse {
        success: true,
        capture_id: receipt.capture_id,
        session_id: receipt.session_id,
        message: receipt.message,
    }))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionsResponse>, (StatusCode, String)> {
    let sessions = state
        .store
        .list_sessions()
        .map_err(|e| error_response("Failed to get sessions", e.into()))?;
    Ok(Json(SessionsResponse { sessions }))
}

pub async fn list_captures(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
) -> Result<Json<CapturesResponse>, (StatusCode, String)> {
    let captures = state
        .store
        .captures_for_session(session_id)
        .map_err(|e| error_response("Failed to get captures", e.into()))?;
    Ok(Json(CapturesResponse { captures }))
}

/// Delete a session together with its captures.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
) -> Result<Json<DeleteSessionResponse>, (StatusCode, String)> {
    let deleted = state
        .store
        .delete_session(session_id)
        .map_err(|e| error_response("Failed to delete session", e.into()))?
        .ok_or_else(|| error_response("", FocusError::NotFound(session_id)))?;

    tracing::info!("Deleted session #{} with {} captures", session_id, deleted);

    Ok(Json(DeleteSessionResponse {
        success: true,
        message: format!(
            "Session #{} and {} captures deleted successfully",
            session_id, deleted
        ),
    }))
}

/// Run the session analysis job.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    let report = analyze_session(&state.store, state.text_model.as_deref(), session_id)
        .await
        .map_err(|e| error_response("Failed to analyze session", e))?;

    Ok(Json(AnalyzeResponse {
        success: true,
        report,
    }))
}
