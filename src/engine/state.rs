use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Inactive,
    Active,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Inactive
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Inactive => f.write_str("inactive"),
            SessionStatus::Active => f.write_str("active"),
        }
    }
}

/// The single observation window owned by an engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub started_at_ms: Option<u64>,
    pub stopped_at_ms: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn begin(&mut self, session_id: String, now_ms: u64, wall: DateTime<Utc>) {
        *self = Self {
            status: SessionStatus::Active,
            session_id: Some(session_id),
            started_at_ms: Some(now_ms),
            stopped_at_ms: None,
            started_at: Some(wall),
            stopped_at: None,
        };
    }

    /// Marks the window closed but keeps its identity and bounds for reporting.
    pub fn end(&mut self, now_ms: u64, wall: DateTime<Utc>) {
        self.status = SessionStatus::Inactive;
        self.stopped_at_ms = Some(now_ms);
        self.stopped_at = Some(wall);
    }

    /// Monotonic length of the window, up to `now_ms` while still active.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let Some(started) = self.started_at_ms else {
            return 0;
        };
        let until = if self.is_active() {
            now_ms
        } else {
            self.stopped_at_ms.unwrap_or(started)
        };
        until.saturating_sub(started)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
