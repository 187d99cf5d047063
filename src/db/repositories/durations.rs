use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::db::{
    connection::Database,
    helpers::{parse_mood, to_i64, to_u64},
};
use crate::engine::DurationLedger;

/// Replaces the stored ledger of `session_id` with `ledger`.
pub(crate) fn write_ledger(
    conn: &Connection,
    session_id: &str,
    ledger: &DurationLedger,
) -> Result<()> {
    conn.execute(
        "DELETE FROM mood_durations WHERE session_id = ?1",
        params![session_id],
    )
    .context("failed to clear previous ledger")?;

    let mut stmt = conn.prepare(
        "INSERT INTO mood_durations (session_id, identity, mood, duration_ms)
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (identity, moods) in ledger.identities() {
        for (mood, ms) in moods {
            stmt.execute(params![session_id, identity, mood.as_str(), to_i64(*ms)?])
                .with_context(|| format!("failed to store {identity}/{mood} duration"))?;
        }
    }
    Ok(())
}

pub(crate) fn read_ledger(conn: &Connection, session_id: &str) -> Result<DurationLedger> {
    let mut stmt = conn.prepare(
        "SELECT identity, mood, duration_ms FROM mood_durations WHERE session_id = ?1",
    )?;
    let mut rows = stmt.query(params![session_id])?;
    let mut ledger = DurationLedger::new();
    while let Some(row) = rows.next()? {
        let identity: String = row.get(0)?;
        let mood: String = row.get(1)?;
        let ms: i64 = row.get(2)?;
        ledger.add(&identity, parse_mood(&mood)?, to_u64(ms, "duration_ms")?);
    }
    Ok(ledger)
}

impl Database {
    pub async fn insert_ledger(&self, session_id: &str, ledger: &DurationLedger) -> Result<()> {
        let session_id = session_id.to_string();
        let ledger = ledger.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            write_ledger(&tx, &session_id, &ledger)?;
            tx.commit().context("failed to commit ledger")?;
            Ok(())
        })
        .await
    }

    pub async fn get_ledger_for_session(&self, session_id: &str) -> Result<DurationLedger> {
        let session_id = session_id.to_string();
        self.execute(move |conn| read_ledger(conn, &session_id)).await
    }
}
