use serde::Serialize;

use crate::models::{FrameObservation, MoodPair};

use super::accumulator::DurationAccumulator;

/// A pair being timed toward the hold threshold but not yet logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCandidate {
    pub pair: MoodPair,
    pub since_ms: u64,
}

/// Debounces recognition flicker into readable log lines.
///
/// A pair is announced once it has been observed continuously for `hold_ms`,
/// and never twice in a row. Timing is forwarded to the accumulator on every
/// cycle regardless of confirmation, so a pair that flickers faster than the
/// hold time still accrues duration while never producing a log line.
#[derive(Debug)]
pub struct ConfirmationFilter {
    hold_ms: u64,
    pending: Option<PendingCandidate>,
    confirmed: Option<MoodPair>,
}

impl ConfirmationFilter {
    pub fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            pending: None,
            confirmed: None,
        }
    }

    /// Handles one cycle. Returns the pair to log when this cycle confirms it.
    pub fn observe(
        &mut self,
        obs: &FrameObservation,
        now_ms: u64,
        accumulator: &mut DurationAccumulator,
    ) -> Option<MoodPair> {
        let Some(pair) = obs.pair() else {
            self.clear();
            accumulator.flush(now_ms);
            return None;
        };

        let mut confirmed = None;
        let held_since = self
            .pending
            .as_ref()
            .filter(|pending| pending.pair == pair)
            .map(|pending| pending.since_ms);

        match held_since {
            Some(since_ms) => {
                let held_ms = now_ms.saturating_sub(since_ms);
                if held_ms >= self.hold_ms && self.confirmed.as_ref() != Some(&pair) {
                    self.confirmed = Some(pair.clone());
                    confirmed = Some(pair.clone());
                }
            }
            None => {
                self.pending = Some(PendingCandidate {
                    pair: pair.clone(),
                    since_ms: now_ms,
                });
            }
        }

        accumulator.update_timing(&pair.identity, pair.mood, now_ms);
        confirmed
    }

    pub fn pending(&self) -> Option<&PendingCandidate> {
        self.pending.as_ref()
    }

    pub fn confirmed(&self) -> Option<&MoodPair> {
        self.confirmed.as_ref()
    }

    pub fn hold_ms(&self) -> u64 {
        self.hold_ms
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.confirmed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Mood;

    fn run(
        filter: &mut ConfirmationFilter,
        acc: &mut DurationAccumulator,
        frames: &[(u64, Option<Mood>)],
    ) -> Vec<(u64, MoodPair)> {
        frames
            .iter()
            .filter_map(|(now, mood)| {
                let obs = match mood {
                    Some(mood) => FrameObservation::present("A", *mood, *now),
                    None => FrameObservation::absent(*now),
                };
                filter.observe(&obs, *now, acc).map(|pair| (*now, pair))
            })
            .collect()
    }

    #[test]
    fn logs_once_after_hold() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames: Vec<_> = [0, 1_000, 2_000, 3_100]
            .into_iter()
            .map(|t| (t, Some(Mood::Happy)))
            .collect();

        let logged = run(&mut filter, &mut acc, &frames);
        assert_eq!(logged, vec![(3_100, MoodPair::new("A", Mood::Happy))]);

        acc.flush(3_100);
        assert_eq!(acc.ledger().get("A", Mood::Happy), 3_100);
    }

    #[test]
    fn change_before_hold_never_logs() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [
            (0, Some(Mood::Happy)),
            (1_500, Some(Mood::Happy)),
            (2_999, Some(Mood::Happy)),
            (3_000, Some(Mood::Sad)),
        ];
        let logged = run(&mut filter, &mut acc, &frames);
        assert!(logged.is_empty());
        assert_eq!(filter.pending().map(|p| p.pair.mood), Some(Mood::Sad));
    }

    #[test]
    fn exact_hold_boundary_logs() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [(0, Some(Mood::Happy)), (3_000, Some(Mood::Happy))];
        assert_eq!(run(&mut filter, &mut acc, &frames).len(), 1);
    }

    #[test]
    fn confirmed_pair_is_not_logged_again() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames: Vec<_> = (0..=20)
            .map(|i| (i * 1_000, Some(Mood::Happy)))
            .collect();
        assert_eq!(run(&mut filter, &mut acc, &frames).len(), 1);
    }

    #[test]
    fn returning_to_logged_pair_after_unconfirmed_flicker_stays_quiet() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [
            (0, Some(Mood::Happy)),
            (3_000, Some(Mood::Happy)),
            (3_500, Some(Mood::Sad)),
            (4_000, Some(Mood::Happy)),
            (7_500, Some(Mood::Happy)),
        ];
        let logged = run(&mut filter, &mut acc, &frames);
        assert_eq!(logged.len(), 1);
    }

    #[test]
    fn intervening_confirmed_pair_allows_relog() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [
            (0, Some(Mood::Happy)),
            (3_000, Some(Mood::Happy)),
            (3_100, Some(Mood::Sad)),
            (6_100, Some(Mood::Sad)),
            (6_200, Some(Mood::Happy)),
            (9_200, Some(Mood::Happy)),
        ];
        let moods: Vec<Mood> = run(&mut filter, &mut acc, &frames)
            .into_iter()
            .map(|(_, pair)| pair.mood)
            .collect();
        assert_eq!(moods, vec![Mood::Happy, Mood::Sad, Mood::Happy]);
    }

    #[test]
    fn absence_clears_state_and_flushes() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [
            (0, Some(Mood::Happy)),
            (3_000, Some(Mood::Happy)),
            (3_400, None),
        ];
        run(&mut filter, &mut acc, &frames);
        assert!(filter.pending().is_none());
        assert!(filter.confirmed().is_none());
        assert!(acc.open_interval().is_none());
        assert_eq!(acc.ledger().get("A", Mood::Happy), 3_400);
    }

    #[test]
    fn reappearing_after_absence_logs_again() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames = [
            (0, Some(Mood::Happy)),
            (3_000, Some(Mood::Happy)),
            (3_100, None),
            (4_000, Some(Mood::Happy)),
            (7_000, Some(Mood::Happy)),
        ];
        assert_eq!(run(&mut filter, &mut acc, &frames).len(), 2);
    }

    #[test]
    fn flicker_accrues_without_logging() {
        let mut filter = ConfirmationFilter::new(3_000);
        let mut acc = DurationAccumulator::new();
        let frames: Vec<_> = (0..50u64)
            .map(|i| {
                let mood = if i % 2 == 0 { Mood::Happy } else { Mood::Angry };
                (i * 120, Some(mood))
            })
            .collect();
        assert!(run(&mut filter, &mut acc, &frames).is_empty());
        acc.flush(49 * 120);
        assert_eq!(acc.ledger().total_ms(), 49 * 120);
    }
}
