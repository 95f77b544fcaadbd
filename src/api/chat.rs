//! Tool-augmented chat endpoint.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::types::{ChatReply, ChatRequest};
use super::AppState;
use crate::config::{ConfigError, LLM_API_KEY_VAR};

/// Run the agentic loop over one user message.
///
/// Tool failures are part of the conversation and never surface here; only a
/// missing credential or a failed primary model call produce a 500.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    let Some(agent) = state.agent.as_ref() else {
        let err = ConfigError::MissingEnvVar(LLM_API_KEY_VAR.to_string());
        tracing::error!("Chat request rejected: {}", err);
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    };

    let outcome = agent.run(&req.user_message).await.map_err(|e| {
        tracing::error!("Chat request failed: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    let tool_calls = if outcome.tool_calls.is_empty() {
        None
    } else {
        Some(outcome.tool_calls)
    };

    Ok(Json(ChatReply {
        content: outcome.content,
        tool_calls,
    }))
}
