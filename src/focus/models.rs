//! Session and capture records.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            "abandoned" => Some(SessionStatus::Abandoned),
            _ => None,
        }
    }
}

impl ToSql for SessionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SessionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        SessionStatus::parse(s).ok_or_else(|| {
            FromSqlError::Other(format!("unknown session status: {}", s).into())
        })
    }
}

/// A time- and topic-bounded group of captures.
///
/// `core_goal`, `main_thread`, `branches` and `action_guide` are filled by
/// analysis; `core_goal` is also seeded with the detected topic when a topic
/// shift opens the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub core_goal: Option<String>,
    /// JSON-encoded list of strings
    pub main_thread: Option<String>,
    /// JSON-encoded list of strings
    pub branches: Option<String>,
    /// Rendered learning guide
    pub action_guide: Option<String>,
}

/// Session row of the session listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub capture_count: usize,
}

/// One captured snippet plus its page metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capture {
    pub id: i64,
    pub session_id: i64,
    pub selected_text: String,
    pub page_url: String,
    pub page_title: Option<String>,
    pub timestamp: DateTime<Utc>,
    // Reserved for per-capture analysis; never written yet.
    pub focus_point: Option<String>,
    pub content_type: Option<String>,
    pub suggested_action: Option<String>,
}
