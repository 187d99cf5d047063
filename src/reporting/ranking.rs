use std::collections::BTreeMap;

use crate::engine::DurationLedger;
use crate::models::Mood;

use super::types::{IdentitySummary, MoodReport, RankedMood};

/// Mood with the greatest time, scanning in declaration order and replacing
/// only on a strictly greater value. `None` when no mood has any time.
pub fn top_mood(totals: &BTreeMap<Mood, u64>) -> Option<Mood> {
    let mut best: Option<(Mood, u64)> = None;
    for mood in Mood::ALL {
        let value = totals.get(&mood).copied().unwrap_or(0);
        let best_value = best.map(|(_, value)| value).unwrap_or(0);
        if value > best_value {
            best = Some((mood, value));
        }
    }
    best.map(|(mood, _)| mood)
}

/// All four moods by descending time. The sort is stable, so ties keep
/// declaration order.
pub fn rank_moods(totals: &BTreeMap<Mood, u64>) -> Vec<RankedMood> {
    let sum = totals.values().fold(0u64, |acc, ms| acc.saturating_add(*ms));
    let mut ranked: Vec<RankedMood> = Mood::ALL
        .iter()
        .map(|mood| {
            let total_ms = totals.get(mood).copied().unwrap_or(0);
            RankedMood {
                mood: *mood,
                total_ms,
                share: if sum == 0 {
                    0.0
                } else {
                    total_ms as f64 / sum as f64
                },
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.total_ms.cmp(&a.total_ms));
    ranked
}

/// Derives totals and rankings from a ledger without touching it.
pub fn build_report(ledger: &DurationLedger) -> MoodReport {
    let mut overall_totals: BTreeMap<Mood, u64> =
        Mood::ALL.iter().map(|mood| (*mood, 0)).collect();
    let mut per_identity_top_mood = BTreeMap::new();
    let mut identities = Vec::new();

    for (identity, moods) in ledger.identities() {
        for (mood, ms) in moods {
            let slot = overall_totals.entry(*mood).or_insert(0);
            *slot = slot.saturating_add(*ms);
        }

        let top = top_mood(moods);
        if let Some(mood) = top {
            per_identity_top_mood.insert(identity.to_string(), mood);
        }

        identities.push(IdentitySummary {
            identity: identity.to_string(),
            total_ms: ledger.identity_total_ms(identity),
            totals: moods.clone(),
            top_mood: top,
            ranked_moods: rank_moods(moods),
        });
    }

    // Ledger iteration is by name, so equal totals stay alphabetical.
    identities.sort_by(|a, b| b.total_ms.cmp(&a.total_ms));

    MoodReport {
        total_ms: ledger.total_ms(),
        overall_top_mood: top_mood(&overall_totals),
        ranked_moods: rank_moods(&overall_totals),
        overall_totals,
        per_identity_top_mood,
        identities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(entries: &[(&str, Mood, u64)]) -> DurationLedger {
        let mut ledger = DurationLedger::new();
        for (identity, mood, ms) in entries {
            ledger.add(identity, *mood, *ms);
        }
        ledger
    }

    #[test]
    fn tie_goes_to_the_earlier_mood() {
        let ledger = ledger(&[("A", Mood::Happy, 500), ("A", Mood::Neutral, 500)]);
        let report = build_report(&ledger);
        assert_eq!(report.overall_top_mood, Some(Mood::Neutral));
        assert_eq!(report.per_identity_top_mood.get("A"), Some(&Mood::Neutral));
    }

    #[test]
    fn overall_sums_across_identities() {
        let ledger = ledger(&[
            ("A", Mood::Happy, 1_000),
            ("A", Mood::Sad, 300),
            ("B", Mood::Sad, 900),
            ("B", Mood::Angry, 100),
        ]);
        let report = build_report(&ledger);

        assert_eq!(report.overall_totals[&Mood::Happy], 1_000);
        assert_eq!(report.overall_totals[&Mood::Sad], 1_200);
        assert_eq!(report.overall_totals[&Mood::Neutral], 0);
        assert_eq!(report.overall_top_mood, Some(Mood::Sad));
        assert_eq!(report.per_identity_top_mood["A"], Mood::Happy);
        assert_eq!(report.per_identity_top_mood["B"], Mood::Sad);
        assert_eq!(report.total_ms, 2_300);

        let order: Vec<Mood> = report.ranked_moods.iter().map(|r| r.mood).collect();
        assert_eq!(order, vec![Mood::Sad, Mood::Happy, Mood::Angry, Mood::Neutral]);
        assert_eq!(report.identities[0].identity, "A");
        assert_eq!(report.identities[0].total_ms, 1_300);
    }

    #[test]
    fn empty_ledger_has_no_top_mood() {
        let report = build_report(&DurationLedger::new());
        assert_eq!(report.overall_top_mood, None);
        assert!(report.identities.is_empty());
        assert!(report.ranked_moods.iter().all(|r| r.share == 0.0));
    }

    #[test]
    fn identity_ties_rank_alphabetically() {
        let ledger = ledger(&[("zoe", Mood::Happy, 10), ("amy", Mood::Sad, 10)]);
        let names: Vec<String> = build_report(&ledger)
            .identities
            .into_iter()
            .map(|s| s.identity)
            .collect();
        assert_eq!(names, vec!["amy".to_string(), "zoe".to_string()]);
    }

    #[test]
    fn report_is_repeatable_and_read_only() {
        let ledger = ledger(&[("A", Mood::Angry, 42)]);
        let before = ledger.clone();
        let first = build_report(&ledger);
        let second = build_report(&ledger);
        assert_eq!(first, second);
        assert_eq!(ledger, before);
    }
}
