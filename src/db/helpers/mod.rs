use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::SessionOutcome;
use crate::models::Mood;

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_outcome(value: &str) -> Result<SessionOutcome> {
    match value {
        "Running" => Ok(SessionOutcome::Running),
        "Completed" => Ok(SessionOutcome::Completed),
        "Interrupted" => Ok(SessionOutcome::Interrupted),
        other => Err(anyhow!("unknown session status {other}")),
    }
}

/// Stored moods are written by us, so anything unexpected is corruption.
pub fn parse_mood(value: &str) -> Result<Mood> {
    match value {
        "neutral" => Ok(Mood::Neutral),
        "happy" => Ok(Mood::Happy),
        "sad" => Ok(Mood::Sad),
        "angry" => Ok(Mood::Angry),
        other => Err(anyhow!("unknown mood {other}")),
    }
}
