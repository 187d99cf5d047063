use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Mood;

/// Accumulated milliseconds per mood for one identity, keyed in mood
/// declaration order.
pub type MoodDurations = BTreeMap<Mood, u64>;

/// identity → mood → accumulated milliseconds.
///
/// Entries are created lazily on the first positive add and only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DurationLedger {
    entries: BTreeMap<String, MoodDurations>,
}

impl DurationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta_ms` to `identity`/`mood`. A zero delta leaves the ledger
    /// untouched and creates no entry.
    pub fn add(&mut self, identity: &str, mood: Mood, delta_ms: u64) {
        if delta_ms == 0 {
            return;
        }
        let slot = self
            .entries
            .entry(identity.to_string())
            .or_default()
            .entry(mood)
            .or_insert(0);
        *slot = slot.saturating_add(delta_ms);
    }

    pub fn get(&self, identity: &str, mood: Mood) -> u64 {
        self.entries
            .get(identity)
            .and_then(|moods| moods.get(&mood))
            .copied()
            .unwrap_or(0)
    }

    pub fn identity(&self, identity: &str) -> Option<&MoodDurations> {
        self.entries.get(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = (&str, &MoodDurations)> {
        self.entries
            .iter()
            .map(|(identity, moods)| (identity.as_str(), moods))
    }

    pub fn identity_total_ms(&self, identity: &str) -> u64 {
        self.entries
            .get(identity)
            .map(|moods| moods.values().fold(0u64, |acc, ms| acc.saturating_add(*ms)))
            .unwrap_or(0)
    }

    pub fn total_ms(&self) -> u64 {
        self.entries
            .keys()
            .fold(0u64, |acc, identity| acc.saturating_add(self.identity_total_ms(identity)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_creates_no_entry() {
        let mut ledger = DurationLedger::new();
        ledger.add("alice", Mood::Happy, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn adds_accumulate_per_identity_and_mood() {
        let mut ledger = DurationLedger::new();
        ledger.add("alice", Mood::Happy, 100);
        ledger.add("alice", Mood::Happy, 50);
        ledger.add("alice", Mood::Sad, 20);
        ledger.add("bob", Mood::Angry, 5);

        assert_eq!(ledger.get("alice", Mood::Happy), 150);
        assert_eq!(ledger.get("alice", Mood::Sad), 20);
        assert_eq!(ledger.get("bob", Mood::Happy), 0);
        assert_eq!(ledger.identity_total_ms("alice"), 170);
        assert_eq!(ledger.total_ms(), 175);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let mut ledger = DurationLedger::new();
        ledger.add("alice", Mood::Neutral, u64::MAX);
        ledger.add("alice", Mood::Neutral, 1);
        assert_eq!(ledger.get("alice", Mood::Neutral), u64::MAX);
    }

    #[test]
    fn serializes_as_nested_map() {
        let mut ledger = DurationLedger::new();
        ledger.add("alice", Mood::Happy, 10);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json, serde_json::json!({ "alice": { "happy": 10 } }));
    }
}
