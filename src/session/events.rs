use anyhow::{Context, Result};
use log::warn;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::db::{Database, SessionOutcome, SessionRecord};
use crate::engine::{CompletedSession, EngineSnapshot, SessionState};
use crate::models::LogEntry;

const EVENT_CAPACITY: usize = 256;

/// What live consumers see, in cycle order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum EngineEvent {
    SessionStarted(SessionState),
    LogEntry {
        session_id: Option<String>,
        entry: LogEntry,
    },
    Heartbeat(EngineSnapshot),
    SessionCompleted(Box<CompletedSession>),
}

/// Fans engine output out to subscribers and, when configured, to SQLite.
#[derive(Clone)]
pub struct EventSink {
    events: broadcast::Sender<EngineEvent>,
    db: Option<Database>,
}

impl EventSink {
    pub fn new(db: Option<Database>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { events, db }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    pub fn emit(&self, event: EngineEvent) {
        // No subscribers is normal.
        let _ = self.events.send(event);
    }

    pub async fn session_started(&self, state: &SessionState, hold_ms: u64) -> Result<()> {
        if let Some(db) = &self.db {
            let id = state
                .session_id
                .clone()
                .context("started session has no id")?;
            let started_at = state.started_at.context("started session has no start time")?;
            db.insert_session(&SessionRecord {
                id,
                started_at,
                stopped_at: None,
                status: SessionOutcome::Running,
                hold_ms,
                active_ms: 0,
                created_at: started_at,
                updated_at: started_at,
            })
            .await?;
        }
        self.emit(EngineEvent::SessionStarted(state.clone()));
        Ok(())
    }

    pub async fn log_entry(&self, session_id: Option<&str>, entry: &LogEntry) -> Result<()> {
        match (&self.db, session_id) {
            (Some(db), Some(id)) => db.insert_log_entry(id, entry).await?,
            (Some(_), None) => warn!("log entry without a session id was not persisted"),
            (None, _) => {}
        }
        self.emit(EngineEvent::LogEntry {
            session_id: session_id.map(str::to_string),
            entry: entry.clone(),
        });
        Ok(())
    }

    /// Announces the completed session, then persists it. Subscribers hear
    /// about the session even when the write fails.
    pub async fn session_completed(&self, completed: &CompletedSession) -> Result<()> {
        self.emit(EngineEvent::SessionCompleted(Box::new(completed.clone())));
        self.persist_completed(completed).await
    }

    pub async fn persist_completed(&self, completed: &CompletedSession) -> Result<()> {
        if let Some(db) = &self.db {
            db.complete_session(completed).await?;
        }
        Ok(())
    }
}
