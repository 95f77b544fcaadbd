//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::agent::ExecutedToolCall;
use crate::focus::{AnalysisReport, Capture, SessionSummary};

/// Request to the tool-augmented chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub user_message: String,
}

/// Final answer of the agentic loop.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub content: String,

    /// Executed tool calls, `null` when none ran
    pub tool_calls: Option<Vec<ExecutedToolCall>>,
}

/// A snippet captured in the browser.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureRequest {
    pub selected_text: String,
    pub page_url: String,
    #[serde(default)]
    pub page_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureResponse {
    pub success: bool,
    pub capture_id: i64,
    pub session_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapturesResponse {
    pub captures: Vec<Capture>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSessionResponse {
    pub success: bool,
    pub message: String,
}

/// Analysis result plus the rendered guide.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
