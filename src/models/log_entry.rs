use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::{Mood, MoodPair};

/// A confirmed "who, what mood, when" line. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub identity: String,
    pub mood: Mood,
    /// Monotonic clock reading at confirmation.
    pub logged_at_ms: u64,
    /// Wall-clock time at confirmation, for display and persistence.
    pub recorded_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(pair: &MoodPair, logged_at_ms: u64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            identity: pair.identity.clone(),
            mood: pair.mood,
            logged_at_ms,
            recorded_at,
        }
    }

    pub fn pair(&self) -> MoodPair {
        MoodPair::new(self.identity.clone(), self.mood)
    }

    /// `"<identity> <mood> HH:MM:SS"` in local time.
    pub fn display_line(&self) -> String {
        let local = self.recorded_at.with_timezone(&Local);
        format!("{} {} {}", self.identity, self.mood, local.format("%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_line_has_identity_mood_and_time() {
        let recorded_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 7).unwrap();
        let entry = LogEntry::new(&MoodPair::new("alice", Mood::Happy), 3100, recorded_at);
        let line = entry.display_line();
        let parts: Vec<&str> = line.split(' ').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "alice");
        assert_eq!(parts[1], "happy");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].ends_with(":07"));
    }
}
