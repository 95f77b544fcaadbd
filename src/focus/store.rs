//! SQLite-backed session and capture storage.
//!
//! Two tables, `sessions` and `captures`, with captures cascading on session
//! delete. Every write is a single statement committed on its own.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{Capture, Session, SessionStatus, SessionSummary};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time TEXT NOT NULL,
    end_time TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    core_goal TEXT,
    main_thread TEXT,
    branches TEXT,
    action_guide TEXT
);

CREATE TABLE IF NOT EXISTS captures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
    selected_text TEXT NOT NULL,
    page_url TEXT NOT NULL,
    page_title TEXT,
    timestamp TEXT NOT NULL,
    focus_point TEXT,
    content_type TEXT,
    suggested_action TEXT
);

CREATE INDEX IF NOT EXISTS idx_sessions_status_start ON sessions(status, start_time);
CREATE INDEX IF NOT EXISTS idx_captures_session_time ON captures(session_id, timestamp);
"#;

const SESSION_COLUMNS: &str =
    "id, start_time, end_time, status, core_goal, main_thread, branches, action_guide";

const CAPTURE_COLUMNS: &str = "id, session_id, selected_text, page_url, page_title, timestamp, \
     focus_point, content_type, suggested_action";

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        status: row.get(3)?,
        core_goal: row.get(4)?,
        main_thread: row.get(5)?,
        branches: row.get(6)?,
        action_guide: row.get(7)?,
    })
}

fn capture_from_row(row: &Row<'_>) -> rusqlite::Result<Capture> {
    Ok(Capture {
        id: row.get(0)?,
        session_id: row.get(1)?,
        selected_text: row.get(2)?,
        page_url: row.get(3)?,
        page_title: row.get(4)?,
        timestamp: row.get(5)?,
        focus_point: row.get(6)?,
        content_type: row.get(7)?,
        suggested_action: row.get(8)?,
    })
}

/// Shared handle to the focus database.
#[derive(Clone)]
pub struct FocusStore {
    conn: Arc<Mutex<Connection>>,
}

impl FocusStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database {}", path.display()))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("failed to initialise focus schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    /// Most recently started session still marked active.
    pub fn latest_active_session(&self) -> Result<Option<Session>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE status = ?1 \
                 ORDER BY start_time DESC, id DESC LIMIT 1"
            ),
            params![SessionStatus::Active],
            session_from_row,
        )
        .optional()
        .context("failed to query active session")
    }

    /// Open a new active session starting now.
    pub fn create_session(&self, core_goal: Option<&str>) -> Result<Session> {
        let conn = self.conn()?;
        let start_time = Utc::now();
        conn.execute(
            "INSERT INTO sessions (start_time, status, core_goal) VALUES (?1, ?2, ?3)",
            params![start_time, SessionStatus::Active, core_goal],
        )
        .context("failed to create session")?;

        Ok(Session {
            id: conn.last_insert_rowid(),
            start_time,
            end_time: None,
            status: SessionStatus::Active,
            core_goal: core_goal.map(str::to_string),
            main_thread: None,
            branches: None,
            action_guide: None,
        })
    }

    /// Mark a session completed with `end_time = now`.
    pub fn complete_session(&self, session_id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE sessions SET status = ?1, end_time = ?2 WHERE id = ?3",
            params![SessionStatus::Completed, Utc::now(), session_id],
        )
        .with_context(|| format!("failed to complete session {}", session_id))?;
        Ok(())
    }

    pub fn get_session(&self, session_id: i64) -> Result<Option<Session>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            params![session_id],
            session_from_row,
        )
        .optional()
        .with_context(|| format!("failed to load session {}", session_id))
    }

    /// All sessions with their capture counts, newest first.
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.start_time, s.end_time, s.status, COUNT(c.id) \
             FROM sessions s LEFT JOIN captures c ON c.session_id = s.id \
             GROUP BY s.id ORDER BY s.start_time DESC, s.id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionSummary {
                id: row.get(0)?,
                start_time: row.get(1)?,
                end_time: row.get(2)?,
                status: row.get(3)?,
                capture_count: row.get::<_, i64>(4)? as usize,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list sessions")
    }

    /// Delete a session and, by cascade, its captures.
    ///
    /// Returns the number of captures removed, or `None` if the session did
    /// not exist.
    pub fn delete_session(&self, session_id: i64) -> Result<Option<usize>> {
        let conn = self.conn()?;
        let exists = conn
            .query_row(
                "SELECT 1 FROM sessions WHERE id = ?1",
                params![session_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let capture_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM captures WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])
            .with_context(|| format!("failed to delete session {}", session_id))?;

        Ok(Some(capture_count as usize))
    }

    /// Persist analysis results and mark the session completed.
    pub fn save_analysis(
        &self,
        session_id: i64,
        core_goal: &str,
        main_thread: &[String],
        branches: &[String],
        action_guide: &str,
    ) -> Result<()> {
        let main_thread = serde_json::to_string(main_thread)?;
        let branches = serde_json::to_string(branches)?;

        let conn = self.conn()?;
        conn.execute(
            "UPDATE sessions SET core_goal = ?1, main_thread = ?2, branches = ?3, \
             action_guide = ?4, status = ?5, end_time = COALESCE(end_time, ?6) WHERE id = ?7",
            params![
                core_goal,
                main_thread,
                branches,
                action_guide,
                SessionStatus::Completed,
                Utc::now(),
                session_id
            ],
        )
        .with_context(|| format!("failed to save analysis for session {}", session_id))?;
        Ok(())
    }

    pub fn insert_capture(
        &self,
        session_id: i64,
        selected_text: &str,
        page_url: &str,
        page_title: Option<&str>,
    ) -> Result<Capture> {
        let conn = self.conn()?;
        let timestamp = Utc::now();
        conn.execute(
            "INSERT INTO captures (session_id, selected_text, page_url, page_title, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, selected_text, page_url, page_title, timestamp],
        )
        .with_context(|| format!("failed to insert capture into session {}", session_id))?;

        Ok(Capture {
            id: conn.last_insert_rowid(),
            session_id,
            selected_text: selected_text.to_string(),
            page_url: page_url.to_string(),
            page_title: page_title.map(str::to_string),
            timestamp,
            focus_point: None,
            content_type: None,
            suggested_action: None,
        })
    }

    /// Most recent captures of a session, newest first.
    pub fn recent_captures(&self, session_id: i64, limit: usize) -> Result<Vec<Capture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CAPTURE_COLUMNS} FROM captures WHERE session_id = ?1 \
             ORDER BY timestamp DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![session_id, limit as i64], capture_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load recent captures")
    }

    /// All captures of a session, oldest first.
    pub fn captures_for_session(&self, session_id: i64) -> Result<Vec<Capture>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {CAPTURE_COLUMNS} FROM captures WHERE session_id = ?1 \
             ORDER BY timestamp ASC, id ASC"
        ))?;
        let rows = stmt.query_map(params![session_id], capture_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to load captures")
    }

    pub fn capture_count(&self, session_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM captures WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
