use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Mood;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMood {
    pub mood: Mood,
    pub total_ms: u64,
    /// Fraction of all tracked time, `0.0` when nothing was tracked.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    pub identity: String,
    pub total_ms: u64,
    pub totals: BTreeMap<Mood, u64>,
    pub top_mood: Option<Mood>,
    pub ranked_moods: Vec<RankedMood>,
}

/// Ranked view over a frozen ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodReport {
    pub total_ms: u64,
    /// Every mood, zero when unseen.
    pub overall_totals: BTreeMap<Mood, u64>,
    pub overall_top_mood: Option<Mood>,
    pub ranked_moods: Vec<RankedMood>,
    pub per_identity_top_mood: BTreeMap<String, Mood>,
    /// Identities by descending presence, ties by name.
    pub identities: Vec<IdentitySummary>,
}
