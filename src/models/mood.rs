use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression class attached to a recognized face.
///
/// Declaration order matters: ranking iterates moods in this order and only
/// replaces the current best on a strictly greater value, so earlier moods win
/// ties.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Neutral,
    Happy,
    Sad,
    Angry,
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Neutral
    }
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Neutral, Mood::Happy, Mood::Sad, Mood::Angry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
        }
    }

    /// Maps a raw label onto the four tracked moods. Missing or unknown labels
    /// (`"surprised"`, `"disgusted"`, empty strings...) collapse to `Neutral`.
    pub fn parse_lenient(raw: Option<&str>) -> Mood {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("happy") => Mood::Happy,
            Some("sad") => Mood::Sad,
            Some("angry") => Mood::Angry,
            _ => Mood::Neutral,
        }
    }

    /// Picks the dominant expression from a score table and returns it with its
    /// score.
    ///
    /// Scores are scanned in the given order and a label only takes over when its
    /// score is strictly greater than the best so far, starting from
    /// `("neutral", 0.0)`. If the winner is not one of the tracked moods the mood
    /// falls back to `Neutral` but the winning score is kept.
    pub fn from_expression_scores<'a, I>(scores: I) -> (Mood, f32)
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut best_label = "neutral";
        let mut best_score = 0.0_f32;

        for (label, score) in scores {
            if score > best_score {
                best_score = score;
                best_label = label;
            }
        }

        (Mood::parse_lenient(Some(best_label)), best_score)
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_labels_normalise_to_neutral() {
        assert_eq!(Mood::parse_lenient(None), Mood::Neutral);
        assert_eq!(Mood::parse_lenient(Some("")), Mood::Neutral);
        assert_eq!(Mood::parse_lenient(Some("surprised")), Mood::Neutral);
        assert_eq!(Mood::parse_lenient(Some(" Happy ")), Mood::Happy);
        assert_eq!(Mood::parse_lenient(Some("ANGRY")), Mood::Angry);
    }

    #[test]
    fn dominant_expression_wins() {
        let scores = [("neutral", 0.1), ("happy", 0.7), ("sad", 0.2)];
        let (mood, score) = Mood::from_expression_scores(scores);
        assert_eq!(mood, Mood::Happy);
        assert!((score - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn untracked_dominant_expression_falls_back_to_neutral() {
        let scores = [("happy", 0.2), ("surprised", 0.8)];
        let (mood, score) = Mood::from_expression_scores(scores);
        assert_eq!(mood, Mood::Neutral);
        assert!((score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn expression_ties_keep_the_first_seen_label() {
        let scores = [("sad", 0.5), ("angry", 0.5)];
        assert_eq!(Mood::from_expression_scores(scores).0, Mood::Sad);
    }

    #[test]
    fn empty_scores_are_neutral() {
        let (mood, score) = Mood::from_expression_scores(std::iter::empty());
        assert_eq!(mood, Mood::Neutral);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Angry).unwrap(), "\"angry\"");
    }
}
