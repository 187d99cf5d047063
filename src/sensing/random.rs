use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{Mood, PerceptionReading};

use super::perception::PerceptionSource;

/// Expression labels a typical face-expression model reports.
const EXPRESSIONS: [&str; 7] = [
    "neutral",
    "happy",
    "sad",
    "angry",
    "fearful",
    "disgusted",
    "surprised",
];

/// Synthetic stand-in for a recognizer: sticky identities and expressions with
/// occasional empty frames and unknown faces.
pub struct RandomPerception {
    rng: StdRng,
    identities: Vec<String>,
    current_identity: Option<usize>,
    dominant_expression: usize,
    absent_probability: f64,
    switch_probability: f64,
    expression_change_probability: f64,
}

impl RandomPerception {
    pub fn new(identities: Vec<String>) -> Self {
        Self::with_rng(identities, StdRng::from_entropy())
    }

    pub fn seeded(identities: Vec<String>, seed: u64) -> Self {
        Self::with_rng(identities, StdRng::seed_from_u64(seed))
    }

    fn with_rng(identities: Vec<String>, rng: StdRng) -> Self {
        Self {
            rng,
            current_identity: if identities.is_empty() { None } else { Some(0) },
            identities,
            dominant_expression: 0,
            absent_probability: 0.02,
            switch_probability: 0.005,
            expression_change_probability: 0.02,
        }
    }

    fn expression_scores(&mut self) -> Vec<(&'static str, f32)> {
        let dominant = self.dominant_expression;
        let peak: f32 = self.rng.gen_range(0.55..0.98);
        let spread = (1.0 - peak) / (EXPRESSIONS.len() - 1) as f32;
        EXPRESSIONS
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let score = if i == dominant { peak } else { spread };
                (*label, score)
            })
            .collect()
    }
}

impl PerceptionSource for RandomPerception {
    fn sample(&mut self) -> Option<PerceptionReading> {
        if self.rng.gen_bool(self.absent_probability) {
            return None;
        }

        if !self.identities.is_empty() && self.rng.gen_bool(self.switch_probability) {
            // One slot past the end stands for an unrecognised face.
            let pick = self.rng.gen_range(0..=self.identities.len());
            self.current_identity = (pick < self.identities.len()).then_some(pick);
        }

        if self.rng.gen_bool(self.expression_change_probability) {
            self.dominant_expression = self.rng.gen_range(0..EXPRESSIONS.len());
        }

        let scores = self.expression_scores();
        let (mood, confidence) = Mood::from_expression_scores(scores);

        Some(PerceptionReading {
            identity: self
                .current_identity
                .and_then(|index| self.identities.get(index).cloned()),
            mood_label: Some(mood.as_str().to_string()),
            confidence,
        })
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FrameObservation;

    #[test]
    fn seeded_sources_are_reproducible() {
        let names = vec!["alice".to_string(), "bob".to_string()];
        let mut first = RandomPerception::seeded(names.clone(), 7);
        let mut second = RandomPerception::seeded(names, 7);
        for _ in 0..200 {
            assert_eq!(first.sample(), second.sample());
        }
    }

    #[test]
    fn readings_normalise_into_tracked_moods() {
        let mut source = RandomPerception::seeded(vec!["alice".into()], 1);
        for i in 0..500 {
            let obs = FrameObservation::from_reading(source.sample(), i);
            assert!(Mood::ALL.contains(&obs.mood));
            assert!((0.0..=1.0).contains(&obs.confidence));
        }
    }

    #[test]
    fn no_identities_means_unknown_faces() {
        let mut source = RandomPerception::seeded(Vec::new(), 3);
        for _ in 0..50 {
            if let Some(reading) = source.sample() {
                assert!(reading.identity.is_none());
            }
        }
    }
}
