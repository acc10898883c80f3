//! SQLite persistence for the logical `Session` record, mirroring the teacher's
//! `Store::open`/`migrate`/upsert-then-load shape.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use agentboard_core::{AgentFamily, Session, WindowKey};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{Result, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS agent_sessions (
    session_id           TEXT PRIMARY KEY,
    log_file_path         TEXT NOT NULL,
    project_path          TEXT,
    slug                   TEXT,
    agent_family           TEXT NOT NULL,
    display_name           TEXT NOT NULL,
    current_window         TEXT,
    is_pinned              INTEGER NOT NULL DEFAULT 0,
    last_resume_error      TEXT,
    last_known_log_size    INTEGER NOT NULL DEFAULT 0,
    last_user_message      TEXT,
    last_activity_at       TEXT NOT NULL,
    created_at             TEXT NOT NULL,
    is_codex_exec          INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_agent_sessions_log_file_path ON agent_sessions(log_file_path);
CREATE INDEX IF NOT EXISTS idx_agent_sessions_current_window ON agent_sessions(current_window);
CREATE INDEX IF NOT EXISTS idx_agent_sessions_slug_project ON agent_sessions(slug, project_path);
";

/// SQLite-backed persistence for `Session` records (§6: "single logical
/// relation `agent_sessions` keyed by `sessionId`").
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert or fully overwrite a session row, keyed by `session_id`.
    pub fn upsert(&self, session: &Session) -> Result<()> {
        self.conn.execute(
            "INSERT INTO agent_sessions
                (session_id, log_file_path, project_path, slug, agent_family, display_name,
                 current_window, is_pinned, last_resume_error, last_known_log_size,
                 last_user_message, last_activity_at, created_at, is_codex_exec)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(session_id) DO UPDATE SET
                log_file_path = excluded.log_file_path,
                project_path = excluded.project_path,
                slug = excluded.slug,
                agent_family = excluded.agent_family,
                display_name = excluded.display_name,
                current_window = excluded.current_window,
                is_pinned = excluded.is_pinned,
                last_resume_error = excluded.last_resume_error,
                last_known_log_size = excluded.last_known_log_size,
                last_user_message = excluded.last_user_message,
                last_activity_at = excluded.last_activity_at,
                created_at = excluded.created_at,
                is_codex_exec = excluded.is_codex_exec",
            params![
                session.session_id,
                session.log_file_path.to_string_lossy(),
                session.project_path,
                session.slug,
                session.agent_family.as_str(),
                session.display_name,
                session.current_window.as_ref().map(|k| k.as_str().to_string()),
                session.is_pinned,
                session.last_resume_error,
                session.last_known_log_size as i64,
                session.last_user_message,
                session.last_activity_at.to_rfc3339(),
                session.created_at.to_rfc3339(),
                session.is_codex_exec,
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, session_id: &str) -> Result<Option<Session>> {
        self.query_one(
            "SELECT * FROM agent_sessions WHERE session_id = ?1",
            params![session_id],
        )
    }

    pub fn get_by_log_path(&self, log_path: &Path) -> Result<Option<Session>> {
        self.query_one(
            "SELECT * FROM agent_sessions WHERE log_file_path = ?1",
            params![log_path.to_string_lossy()],
        )
    }

    pub fn get_by_window(&self, window: &WindowKey) -> Result<Option<Session>> {
        self.query_one(
            "SELECT * FROM agent_sessions WHERE current_window = ?1",
            params![window.as_str()],
        )
    }

    /// Sessions sharing `(slug, project_path)` (§I5: same slug is fine across
    /// distinct projects, or across one live + one orphaned session).
    pub fn get_by_slug_project(&self, slug: &str, project_path: Option<&str>) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM agent_sessions WHERE slug = ?1 AND project_path IS ?2",
        )?;
        let rows = stmt.query_map(params![slug, project_path], row_to_session)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }

    /// Sessions with a live `current_window` (§6: active/inactive partitioning).
    pub fn list_active(&self) -> Result<Vec<Session>> {
        self.query_all("SELECT * FROM agent_sessions WHERE current_window IS NOT NULL")
    }

    /// Sessions with no live window — orphans.
    pub fn list_inactive(&self) -> Result<Vec<Session>> {
        self.query_all("SELECT * FROM agent_sessions WHERE current_window IS NULL")
    }

    pub fn list_all(&self) -> Result<Vec<Session>> {
        self.query_all("SELECT * FROM agent_sessions")
    }

    /// Clear the current window from every session that points at `window`,
    /// used when a window disappears from the enumerator (§4.7 supersede/orphan
    /// handling never touches rows via SQL deletes — sessions persist).
    pub fn clear_window(&self, window: &WindowKey) -> Result<()> {
        self.conn.execute(
            "UPDATE agent_sessions SET current_window = NULL WHERE current_window = ?1",
            params![window.as_str()],
        )?;
        Ok(())
    }

    fn query_one(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Option<Session>> {
        self.conn
            .query_row(sql, params, row_to_session)
            .optional()
            .map_err(StoreError::from)
    }

    fn query_all(&self, sql: &str) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], row_to_session)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(StoreError::from)
    }
}

fn parse_rfc3339(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    let log_file_path: String = row.get("log_file_path")?;
    let agent_family_str: String = row.get("agent_family")?;
    let current_window: Option<String> = row.get("current_window")?;
    let last_known_log_size: i64 = row.get("last_known_log_size")?;
    let last_activity_at: String = row.get("last_activity_at")?;
    let created_at: String = row.get("created_at")?;

    Ok(Session {
        session_id: row.get("session_id")?,
        log_file_path: PathBuf::from(log_file_path),
        project_path: row.get("project_path")?,
        slug: row.get("slug")?,
        agent_family: AgentFamily::from_str(&agent_family_str).unwrap_or(AgentFamily::Unknown),
        display_name: row.get("display_name")?,
        current_window: current_window.map(WindowKey::from),
        is_pinned: row.get("is_pinned")?,
        last_resume_error: row.get("last_resume_error")?,
        last_known_log_size: last_known_log_size as u64,
        last_user_message: row.get("last_user_message")?,
        last_activity_at: parse_rfc3339(&last_activity_at),
        created_at: parse_rfc3339(&created_at),
        is_codex_exec: row.get("is_codex_exec")?,
    })
}
