use serde::Serialize;

use crate::models::{Mood, MoodPair};

use super::ledger::DurationLedger;

/// The span currently accruing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInterval {
    pub pair: MoodPair,
    pub opened_at_ms: u64,
}

/// Turns raw per-cycle presence into ledger time.
///
/// Callers report presence with [`update_timing`](Self::update_timing) once per
/// cycle and call [`flush`](Self::flush) once when presence ends; the ledger then
/// matches the observed presence to within one cycle period.
#[derive(Debug, Default)]
pub struct DurationAccumulator {
    open: Option<OpenInterval>,
    ledger: DurationLedger,
}

impl DurationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_timing(&mut self, identity: &str, mood: Mood, now_ms: u64) {
        let Some(open) = self.open.as_mut() else {
            self.open = Some(OpenInterval {
                pair: MoodPair::new(identity, mood),
                opened_at_ms: now_ms,
            });
            return;
        };

        // Non-positive deltas (clock jitter, duplicate timestamps) add nothing.
        if let Some(delta) = now_ms.checked_sub(open.opened_at_ms) {
            self.ledger.add(identity, mood, delta);
        }

        if !open.pair.matches(identity, mood) {
            open.pair = MoodPair::new(identity, mood);
        }
        open.opened_at_ms = now_ms;
    }

    /// Closes the open interval, crediting the time since it was last touched.
    /// A second flush without an intervening update is a no-op.
    pub fn flush(&mut self, now_ms: u64) {
        if let Some(open) = self.open.take() {
            if let Some(delta) = now_ms.checked_sub(open.opened_at_ms) {
                self.ledger.add(&open.pair.identity, open.pair.mood, delta);
            }
        }
    }

    pub fn open_interval(&self) -> Option<&OpenInterval> {
        self.open.as_ref()
    }

    pub fn ledger(&self) -> &DurationLedger {
        &self.ledger
    }

    /// Drops the open interval and all accrued time.
    pub fn reset(&mut self) {
        self.open = None;
        self.ledger.clear();
    }
}
