use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime, parse_outcome, to_i64, to_u64},
    models::{SessionOutcome, SessionRecord, SessionSummary},
};
use crate::engine::CompletedSession;
use crate::reporting::build_report;

use super::durations::{read_ledger, write_ledger};

const SESSION_COLUMNS: &str =
    "id, started_at, stopped_at, status, hold_ms, active_ms, created_at, updated_at";

fn row_to_session(row: &Row) -> Result<SessionRecord> {
    let started_at: String = row.get("started_at")?;
    let stopped_at: Option<String> = row.get("stopped_at")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let status: String = row.get("status")?;
    let hold_ms: i64 = row.get("hold_ms")?;
    let active_ms: i64 = row.get("active_ms")?;

    Ok(SessionRecord {
        id: row.get("id")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        stopped_at: parse_optional_datetime(stopped_at, "stopped_at")?,
        status: parse_outcome(&status)?,
        hold_ms: to_u64(hold_ms, "hold_ms")?,
        active_ms: to_u64(active_ms, "active_ms")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO sessions (id, started_at, stopped_at, status, hold_ms, active_ms, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.started_at.to_rfc3339(),
                    record.stopped_at.as_ref().map(|dt| dt.to_rfc3339()),
                    record.status.as_str(),
                    to_i64(record.hold_ms)?,
                    to_i64(record.active_ms)?,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .context("failed to insert session")?;
            Ok(())
        })
        .await
    }

    pub async fn mark_session_status(
        &self,
        session_id: &str,
        status: SessionOutcome,
        active_ms: u64,
        stopped_at: Option<DateTime<Utc>>,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET status = ?1,
                     active_ms = ?2,
                     stopped_at = ?3,
                     updated_at = ?4
                 WHERE id = ?5",
                params![
                    status.as_str(),
                    to_i64(active_ms)?,
                    stopped_at.map(|dt| dt.to_rfc3339()),
                    updated_at.to_rfc3339(),
                    session_id,
                ],
            )
            .context("failed to update session status")?;
            Ok(())
        })
        .await
    }

    /// Marks the session completed and stores its final ledger atomically.
    pub async fn complete_session(&self, completed: &CompletedSession) -> Result<()> {
        let session_id = completed
            .session
            .session_id
            .clone()
            .context("completed session has no id")?;
        let stopped_at = completed.session.stopped_at.unwrap_or_else(Utc::now);
        let active_ms = completed.active_ms;
        let ledger = completed.ledger.clone();

        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE sessions
                 SET status = ?1,
                     active_ms = ?2,
                     stopped_at = ?3,
                     updated_at = ?3
                 WHERE id = ?4",
                params![
                    SessionOutcome::Completed.as_str(),
                    to_i64(active_ms)?,
                    stopped_at.to_rfc3339(),
                    session_id,
                ],
            )
            .context("failed to complete session")?;
            write_ledger(&tx, &session_id, &ledger)?;
            tx.commit().context("failed to commit completed session")?;
            Ok(())
        })
        .await
    }

    /// Closes a session that never reached `stop`, keeping its last known
    /// active time.
    pub async fn mark_session_interrupted(
        &self,
        session_id: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE sessions
                 SET status = ?1,
                     stopped_at = COALESCE(stopped_at, ?2),
                     updated_at = ?2
                 WHERE id = ?3",
                params![SessionOutcome::Interrupted.as_str(), at.to_rfc3339(), session_id],
            )
            .context("failed to mark session interrupted")?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
            ))?;
            let mut rows = stmt.query(params![session_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_session(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Sessions a crash left in `Running`, newest first.
    pub async fn get_incomplete_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE status = 'Running'
                 ORDER BY started_at DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    /// Session history, newest first, each with its dominant mood.
    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS},
                        (SELECT COUNT(*) FROM log_entries l WHERE l.session_id = s.id) AS log_count
                 FROM sessions s
                 ORDER BY started_at DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut summaries = Vec::new();
            while let Some(row) = rows.next()? {
                let record = row_to_session(row)?;
                let log_count: i64 = row.get("log_count")?;

                let ledger = read_ledger(conn, &record.id)?;
                let report = build_report(&ledger);

                summaries.push(SessionSummary {
                    id: record.id,
                    started_at: record.started_at,
                    stopped_at: record.stopped_at,
                    status: record.status,
                    active_ms: record.active_ms,
                    tracked_ms: report.total_ms,
                    log_entries: to_u64(log_count, "log_count")?,
                    top_mood: report.overall_top_mood,
                });
            }
            Ok(summaries)
        })
        .await
    }
}
