use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_mood, to_i64, to_u64},
};
use crate::models::LogEntry;

impl Database {
    pub async fn insert_log_entry(&self, session_id: &str, entry: &LogEntry) -> Result<()> {
        let session_id = session_id.to_string();
        let entry = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO log_entries (session_id, identity, mood, logged_at_ms, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    session_id,
                    entry.identity,
                    entry.mood.as_str(),
                    to_i64(entry.logged_at_ms)?,
                    entry.recorded_at.to_rfc3339(),
                ],
            )
            .context("failed to insert log entry")?;
            Ok(())
        })
        .await
    }

    /// Log lines of a session in the order they were written.
    pub async fn get_log_entries_for_session(&self, session_id: &str) -> Result<Vec<LogEntry>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT identity, mood, logged_at_ms, recorded_at
                 FROM log_entries
                 WHERE session_id = ?1
                 ORDER BY id ASC",
            )?;
            let mut rows = stmt.query(params![session_id])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                let mood: String = row.get(1)?;
                let logged_at_ms: i64 = row.get(2)?;
                let recorded_at: String = row.get(3)?;
                entries.push(LogEntry {
                    identity: row.get(0)?,
                    mood: parse_mood(&mood)?,
                    logged_at_ms: to_u64(logged_at_ms, "logged_at_ms")?,
                    recorded_at: parse_datetime(&recorded_at, "recorded_at")?,
                });
            }
            Ok(entries)
        })
        .await
    }
}
