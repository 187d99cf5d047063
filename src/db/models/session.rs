//! Persisted session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Mood;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SessionOutcome {
    Running,
    Completed,
    Interrupted,
}

impl SessionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOutcome::Running => "Running",
            SessionOutcome::Completed => "Completed",
            SessionOutcome::Interrupted => "Interrupted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionOutcome,
    pub hold_ms: u64,
    pub active_ms: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the session history list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub status: SessionOutcome,
    pub active_ms: u64,
    pub tracked_ms: u64,
    pub log_entries: u64,
    pub top_mood: Option<Mood>,
}
