use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::models::{FrameObservation, LogEntry, MoodPair, PerceptionReading};
use crate::reporting::{build_report, MoodReport};

use super::{
    accumulator::{DurationAccumulator, OpenInterval},
    config::EngineConfig,
    error::{EngineError, EngineResult},
    filter::{ConfirmationFilter, PendingCandidate},
    ledger::DurationLedger,
    live::{FpsMeter, LiveStatus},
    state::{SessionState, SessionStatus},
};

/// Everything a closed session leaves behind for the sinks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSession {
    pub session: SessionState,
    pub active_ms: u64,
    pub ledger: DurationLedger,
    pub log: Vec<LogEntry>,
    pub report: MoodReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub session: SessionState,
    pub live: LiveStatus,
    pub elapsed_ms: u64,
    pub tracked_ms: u64,
    pub log_entries: usize,
}

/// Owns the filter, the accumulator, the log and the session window.
///
/// Every method takes `&mut self`; callers that share an engine across tasks
/// wrap it in a single mutex so no two cycles ever interleave.
pub struct MoodEngine {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    filter: ConfirmationFilter,
    accumulator: DurationAccumulator,
    log: Vec<LogEntry>,
    visible_from: usize,
    session: SessionState,
    live: LiveStatus,
    fps: FpsMeter,
}

impl MoodEngine {
    pub fn new(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            filter: ConfirmationFilter::new(config.hold_ms),
            config,
            clock,
            accumulator: DurationAccumulator::new(),
            log: Vec::new(),
            visible_from: 0,
            session: SessionState::new(),
            live: LiveStatus::default(),
            fps: FpsMeter::default(),
        }
    }

    pub fn with_system_clock(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(SystemClock::new()))
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Stamps a raw perception result with the engine clock and observes it.
    pub fn observe_reading(&mut self, reading: Option<PerceptionReading>) -> Option<LogEntry> {
        let obs = FrameObservation::from_reading(reading, self.clock.now_ms());
        self.observe(&obs)
    }

    /// Runs one cycle. Live status is refreshed always; the filter, the ledger
    /// and the log only move while a session is active.
    pub fn observe(&mut self, obs: &FrameObservation) -> Option<LogEntry> {
        let now_ms = obs.captured_at_ms;
        let fps = self.fps.tick(now_ms);
        self.live.record(obs, fps);

        if !self.session.is_active() {
            return None;
        }

        let pair = self.filter.observe(obs, now_ms, &mut self.accumulator)?;
        let entry = LogEntry::new(&pair, now_ms, self.clock.wall_now());
        self.log.push(entry.clone());
        Some(entry)
    }

    /// Opens a fresh session with an empty ledger and log.
    pub fn start(&mut self) -> EngineResult<SessionState> {
        let state = self.prepare_start()?;
        self.commit_start(state.clone())?;
        Ok(state)
    }

    /// The session [`start`](Self::start) would open, leaving the engine
    /// untouched. The previous session's ledger, log and report stay intact
    /// until [`commit_start`](Self::commit_start).
    pub fn prepare_start(&self) -> EngineResult<SessionState> {
        self.ensure_inactive()?;
        let mut state = SessionState::new();
        state.begin(
            Uuid::new_v4().to_string(),
            self.clock.now_ms(),
            self.clock.wall_now(),
        );
        Ok(state)
    }

    /// Installs a session from [`prepare_start`](Self::prepare_start), clearing
    /// the previous session's tracking.
    pub fn commit_start(&mut self, state: SessionState) -> EngineResult<()> {
        self.ensure_inactive()?;
        self.clear_tracking();
        self.session = state;
        Ok(())
    }

    fn ensure_inactive(&self) -> EngineResult<()> {
        if self.session.is_active() {
            return Err(EngineError::InvalidState {
                operation: "start",
                state: SessionStatus::Active,
            });
        }
        Ok(())
    }

    /// Closes the session, crediting any open interval up to now, and returns
    /// the frozen ledger, log and report.
    pub fn stop(&mut self) -> EngineResult<CompletedSession> {
        if !self.session.is_active() {
            return Err(EngineError::InvalidState {
                operation: "stop",
                state: SessionStatus::Inactive,
            });
        }

        let now_ms = self.clock.now_ms();
        self.accumulator.flush(now_ms);
        self.filter.clear();
        self.session.end(now_ms, self.clock.wall_now());

        Ok(CompletedSession {
            session: self.session.clone(),
            active_ms: self.session.elapsed_ms(now_ms),
            ledger: self.accumulator.ledger().clone(),
            log: self.log.clone(),
            report: build_report(self.accumulator.ledger()),
        })
    }

    /// Report over the ledger of the last stopped session. `None` while a session
    /// is running or before any session ran.
    pub fn report(&self) -> Option<MoodReport> {
        if self.session.is_active() || self.session.session_id.is_none() {
            return None;
        }
        Some(build_report(self.accumulator.ledger()))
    }

    /// Back to the freshly constructed state, session included.
    pub fn reset(&mut self) {
        self.clear_tracking();
        self.session.reset();
        self.live = LiveStatus::default();
        self.fps = FpsMeter::default();
    }

    /// Hides the current log lines from [`visible_log`](Self::visible_log).
    /// The session log and the ledger are untouched.
    pub fn clear_log(&mut self) {
        self.visible_from = self.log.len();
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now_ms = self.clock.now_ms();
        EngineSnapshot {
            session: self.session.clone(),
            live: self.live.clone(),
            elapsed_ms: self.session.elapsed_ms(now_ms),
            tracked_ms: self.accumulator.ledger().total_ms(),
            log_entries: self.log.len(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn ledger(&self) -> &DurationLedger {
        self.accumulator.ledger()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn visible_log(&self) -> &[LogEntry] {
        &self.log[self.visible_from.min(self.log.len())..]
    }

    pub fn live_status(&self) -> &LiveStatus {
        &self.live
    }

    pub fn pending(&self) -> Option<&PendingCandidate> {
        self.filter.pending()
    }

    pub fn confirmed(&self) -> Option<&MoodPair> {
        self.filter.confirmed()
    }

    pub fn open_interval(&self) -> Option<&OpenInterval> {
        self.accumulator.open_interval()
    }

    fn clear_tracking(&mut self) {
        self.filter.clear();
        self.accumulator.reset();
        self.log.clear();
        self.visible_from = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::models::Mood;

    fn engine() -> (MoodEngine, ManualClock) {
        let clock = ManualClock::new(0);
        let engine = MoodEngine::new(EngineConfig::default(), Arc::new(clock.clone()));
        (engine, clock)
    }

    fn present(clock: &ManualClock, at: u64, identity: &str, mood: Mood) -> FrameObservation {
        clock.set(at);
        FrameObservation::present(identity, mood, at)
    }

    #[test]
    fn prepared_start_leaves_previous_session_until_committed() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        for t in [0, 500] {
            let obs = present(&clock, t, "A", Mood::Sad);
            engine.observe(&obs);
        }
        engine.stop().unwrap();

        let next = engine.prepare_start().unwrap();
        assert!(next.is_active());
        assert!(!engine.session().is_active());
        assert_eq!(engine.report().unwrap().total_ms, 500);

        engine.commit_start(next.clone()).unwrap();
        assert_eq!(engine.session().session_id, next.session_id);
        assert!(engine.ledger().is_empty());
        assert!(engine.log().is_empty());
        assert!(engine.prepare_start().is_err());
    }

    #[test]
    fn start_twice_is_invalid_and_keeps_state() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        let obs = present(&clock, 100, "A", Mood::Happy);
        engine.observe(&obs);

        let err = engine.start().unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                operation: "start",
                state: SessionStatus::Active
            }
        );
        assert!(engine.session().is_active());
        assert!(engine.open_interval().is_some());
    }

    #[test]
    fn stop_while_inactive_is_invalid() {
        let (mut engine, _clock) = engine();
        assert!(matches!(
            engine.stop(),
            Err(EngineError::InvalidState {
                operation: "stop",
                ..
            })
        ));
        assert_eq!(engine.session().status, SessionStatus::Inactive);
    }

    #[test]
    fn scenario_produces_one_log_and_full_duration() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();

        let mut logged = Vec::new();
        for t in [0, 1_000, 2_000, 3_100] {
            let obs = present(&clock, t, "A", Mood::Happy);
            logged.extend(engine.observe(&obs));
        }
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].identity, "A");
        assert_eq!(logged[0].mood, Mood::Happy);
        assert_eq!(logged[0].logged_at_ms, 3_100);

        let done = engine.stop().unwrap();
        assert_eq!(done.ledger.get("A", Mood::Happy), 3_100);
        assert_eq!(done.log.len(), 1);
        assert_eq!(done.active_ms, 3_100);
        assert_eq!(done.report.overall_top_mood, Some(Mood::Happy));
    }

    #[test]
    fn stop_closes_open_interval_without_new_observation() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        let obs = present(&clock, 0, "A", Mood::Sad);
        engine.observe(&obs);
        clock.set(700);

        let done = engine.stop().unwrap();
        assert_eq!(done.ledger.get("A", Mood::Sad), 700);
        assert!(engine.open_interval().is_none());
    }

    #[test]
    fn observations_outside_a_session_touch_nothing() {
        let (mut engine, clock) = engine();
        for t in [0, 1_000, 2_000, 3_500] {
            let obs = present(&clock, t, "A", Mood::Happy);
            assert!(engine.observe(&obs).is_none());
        }
        assert!(engine.ledger().is_empty());
        assert!(engine.log().is_empty());
        assert!(engine.pending().is_none());
        assert_eq!(engine.live_status().identity.as_deref(), Some("A"));
    }

    #[test]
    fn start_resets_previous_session() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        for t in [0, 3_000, 4_000] {
            let obs = present(&clock, t, "A", Mood::Angry);
            engine.observe(&obs);
        }
        engine.stop().unwrap();
        assert!(!engine.ledger().is_empty());
        assert_eq!(engine.log().len(), 1);

        clock.set(10_000);
        let session = engine.start().unwrap();
        assert!(engine.ledger().is_empty());
        assert!(engine.log().is_empty());
        assert!(engine.confirmed().is_none());
        assert!(engine.open_interval().is_none());
        assert_eq!(session.started_at_ms, Some(10_000));
    }

    #[test]
    fn report_only_after_stop() {
        let (mut engine, clock) = engine();
        assert!(engine.report().is_none());
        engine.start().unwrap();
        let obs = present(&clock, 0, "A", Mood::Neutral);
        engine.observe(&obs);
        assert!(engine.report().is_none());

        clock.set(500);
        let done = engine.stop().unwrap();
        assert_eq!(engine.report(), Some(done.report.clone()));
        assert_eq!(engine.report(), engine.report());
    }

    #[test]
    fn unavailable_perception_flushes() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        engine.observe_reading(Some(PerceptionReading::new("A", Mood::Happy, 0.9)));
        clock.set(400);
        engine.observe_reading(None);
        clock.set(5_000);

        let done = engine.stop().unwrap();
        assert_eq!(done.ledger.get("A", Mood::Happy), 400);
    }

    #[test]
    fn clear_log_hides_lines_but_keeps_session_log() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        for t in [0, 3_000] {
            let obs = present(&clock, t, "A", Mood::Happy);
            engine.observe(&obs);
        }
        assert_eq!(engine.visible_log().len(), 1);
        engine.clear_log();
        assert!(engine.visible_log().is_empty());
        assert_eq!(engine.log().len(), 1);
        assert_eq!(engine.ledger().get("A", Mood::Happy), 3_000);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        let obs = present(&clock, 0, "A", Mood::Happy);
        engine.observe(&obs);
        engine.reset();

        assert_eq!(engine.session().status, SessionStatus::Inactive);
        assert!(engine.session().session_id.is_none());
        assert!(engine.ledger().is_empty());
        assert!(engine.open_interval().is_none());
        assert!(engine.report().is_none());
        assert!(engine.start().is_ok());
    }
}
