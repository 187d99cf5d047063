use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Duration;

use crate::db::{Database, SessionOutcome};
use crate::engine::{CompletedSession, EngineConfig, EngineSnapshot, MoodEngine, SessionState};
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::models::{LogEntry, PerceptionReading};
use crate::reporting::MoodReport;
use crate::sensing::{run_cycle, CycleContext, CycleOutcome, PerceptionSource, SensingController};
use crate::settings::debug_mode_enabled;

use super::events::{EngineEvent, EventSink};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// The single entry point to a shared engine.
///
/// Cycles, session start/stop, reports and resets all go through the same
/// engine mutex, so nothing ever mutates the ledger concurrently.
#[derive(Clone)]
pub struct SessionController {
    engine: Arc<Mutex<MoodEngine>>,
    config: EngineConfig,
    sink: EventSink,
    metrics: MetricsCollector,
    sensing: Arc<Mutex<SensingController>>,
    /// Stopped sessions whose final write failed, oldest first.
    unsaved: Arc<Mutex<Vec<CompletedSession>>>,
    heartbeat_every_cycles: u32,
}

impl SessionController {
    pub fn new(engine: MoodEngine, db: Option<Database>) -> Self {
        let debug_mode = debug_mode_enabled();

        Self {
            config: *engine.config(),
            engine: Arc::new(Mutex::new(engine)),
            sink: EventSink::new(db),
            metrics: MetricsCollector::new(),
            sensing: Arc::new(Mutex::new(SensingController::new())),
            unsaved: Arc::new(Mutex::new(Vec::new())),
            heartbeat_every_cycles: if debug_mode { 1 } else { 10 },
        }
    }

    fn cycle_context(&self) -> CycleContext {
        CycleContext {
            engine: self.engine.clone(),
            sink: self.sink.clone(),
            metrics: self.metrics.clone(),
            heartbeat_every_cycles: self.heartbeat_every_cycles,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.sink.subscribe()
    }

    pub fn database(&self) -> Option<&Database> {
        self.sink.database()
    }

    /// Starts polling `source` in the background.
    pub async fn start_monitoring(&self, source: Box<dyn PerceptionSource>) -> Result<()> {
        let delay = Duration::from_millis(self.config.cycle_delay_ms);
        self.sensing
            .lock()
            .await
            .start_sensing(self.cycle_context(), source, delay)?;
        log_info!("monitoring started");
        Ok(())
    }

    pub async fn stop_monitoring(&self) -> Result<()> {
        self.sensing.lock().await.stop_sensing().await
    }

    pub async fn is_monitoring(&self) -> bool {
        self.sensing.lock().await.is_running()
    }

    /// Runs one cycle for callers that drive perception themselves.
    pub async fn observe(&self, reading: Option<PerceptionReading>) -> Result<CycleOutcome> {
        run_cycle(&self.cycle_context(), reading, 0, false).await
    }

    /// Opens a session. The session row is written before the engine drops
    /// the previous session's data, so a failed write leaves that data intact.
    pub async fn start_session(&self) -> Result<SessionState> {
        let mut engine = self.engine.lock().await;
        let state = engine.prepare_start()?;
        let session_id = state.session_id.clone().unwrap_or_default();

        if let Err(err) = self.sink.session_started(&state, self.config.hold_ms).await {
            log_error!("failed to record start of session {}: {err:?}", session_id);
            return Err(err.context("failed to record session start"));
        }
        engine.commit_start(state.clone())?;
        drop(engine);

        self.metrics.reset().await;
        log_info!("session {} started", session_id);
        Ok(state)
    }

    /// Closes the running session at the next cycle boundary and hands back
    /// the frozen ledger, log and report.
    ///
    /// A failed final write does not fail the stop: the session is kept for
    /// [`persist_unsaved`](Self::persist_unsaved) and its row is moved off
    /// `Running` so startup recovery leaves it alone.
    pub async fn stop_session(&self) -> Result<CompletedSession> {
        let completed = {
            let mut engine = self.engine.lock().await;
            engine.stop()?
        };

        let session_id = completed.session.session_id.clone().unwrap_or_default();
        log_info!(
            "session {} stopped: {}ms active, {}ms tracked, {} log entries",
            session_id,
            completed.active_ms,
            completed.report.total_ms,
            completed.log.len()
        );

        if let Err(err) = self.sink.session_completed(&completed).await {
            log_error!(
                "failed to persist session {}, keeping it for retry: {err:?}",
                session_id
            );
            self.mark_stopped(&completed).await;
            self.unsaved.lock().await.push(completed.clone());
        }

        Ok(completed)
    }

    /// Best-effort status update for a session whose final write failed.
    async fn mark_stopped(&self, completed: &CompletedSession) {
        let (Some(db), Some(id)) = (self.sink.database(), completed.session.session_id.as_deref())
        else {
            return;
        };
        let now = Utc::now();
        if let Err(err) = db
            .mark_session_status(
                id,
                SessionOutcome::Completed,
                completed.active_ms,
                completed.session.stopped_at.or(Some(now)),
                now,
            )
            .await
        {
            log_warn!("session {} is still marked running: {err:?}", id);
        }
    }

    /// Retries the final write of every session whose stop could not be
    /// persisted. Returns how many were written; the rest stay queued.
    pub async fn persist_unsaved(&self) -> Result<usize> {
        let mut unsaved = self.unsaved.lock().await;
        let mut written = 0;
        while let Some(completed) = unsaved.first() {
            self.sink.persist_completed(completed).await.with_context(|| {
                format!(
                    "failed to persist session {}",
                    completed.session.session_id.as_deref().unwrap_or_default()
                )
            })?;
            unsaved.remove(0);
            written += 1;
        }
        Ok(written)
    }

    pub async fn unsaved_count(&self) -> usize {
        self.unsaved.lock().await.len()
    }

    /// Report of the last stopped session.
    pub async fn report(&self) -> Option<MoodReport> {
        self.engine.lock().await.report()
    }

    pub async fn get_snapshot(&self) -> EngineSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn visible_log(&self) -> Vec<LogEntry> {
        self.engine.lock().await.visible_log().to_vec()
    }

    pub async fn clear_log(&self) {
        self.engine.lock().await.clear_log();
    }

    pub async fn metrics(&self) -> MetricsSnapshot {
        self.metrics.get_snapshot().await
    }

    /// Drops all engine state. A running session is abandoned and, when
    /// persisted, recorded as interrupted.
    pub async fn reset(&self) -> Result<()> {
        let abandoned = {
            let mut engine = self.engine.lock().await;
            let abandoned = engine
                .session()
                .is_active()
                .then(|| engine.session().session_id.clone())
                .flatten();
            engine.reset();
            abandoned
        };

        if let (Some(id), Some(db)) = (abandoned, self.sink.database()) {
            log_warn!("session {} abandoned by reset", id);
            db.mark_session_interrupted(&id, Utc::now()).await?;
        }
        self.metrics.reset().await;
        Ok(())
    }

    /// Stops the loop and closes any running session.
    pub async fn shutdown(&self) -> Result<Option<CompletedSession>> {
        self.stop_monitoring().await?;
        let active = self.engine.lock().await.session().is_active();
        if active {
            return self.stop_session().await.map(Some);
        }
        Ok(None)
    }
}

/// Marks sessions left running by a previous crash as interrupted.
pub async fn recover_interrupted_sessions(db: &Database) -> Result<usize> {
    let sessions = db.get_incomplete_sessions().await?;
    let now = Utc::now();
    for session in &sessions {
        log_warn!(
            "Recovered incomplete session {}; marking as Interrupted",
            session.id
        );
        db.mark_session_interrupted(&session.id, now).await?;
    }
    Ok(sessions.len())
}
