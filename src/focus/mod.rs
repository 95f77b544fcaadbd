//! Learning focus capture: sessions of captured snippets, topic-shift based
//! session boundaries, and AI session analysis.

pub mod analysis;
pub mod boundary;
pub mod capture;
pub mod models;
mod prompts;
pub mod store;

pub use analysis::{analyze_session, render_guide, AnalysisReport, SessionAnalysis};
pub use boundary::{
    apply_decision, select_session, snapshot_active_session, ActiveSnapshot, BoundaryDecision,
    BoundaryPolicy, SessionSelection,
};
pub use capture::{record_capture, CaptureReceipt, NewCapture};
pub use models::{Capture, Session, SessionStatus, SessionSummary};
pub use store::FocusStore;

use thiserror::Error;

use crate::config::ConfigError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum FocusError {
    #[error("Session {0} not found")]
    NotFound(i64),

    #[error("Session has no captures to analyze")]
    NoCaptures,

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Analysis model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("{0}")]
    Parse(String),

    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for FocusError {
    fn from(e: anyhow::Error) -> Self {
        FocusError::Storage(e)
    }
}
