use serde::{Deserialize, Serialize};

use super::Mood;

/// Raw per-cycle output of the perception collaborator before normalisation.
///
/// `identity` is `None` when a face was found but did not match anyone known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceptionReading {
    pub identity: Option<String>,
    pub mood_label: Option<String>,
    pub confidence: f32,
}

impl PerceptionReading {
    pub fn new(identity: impl Into<String>, mood: Mood, confidence: f32) -> Self {
        Self {
            identity: Some(identity.into()),
            mood_label: Some(mood.as_str().to_string()),
            confidence,
        }
    }

    pub fn unknown_face(mood: Mood, confidence: f32) -> Self {
        Self {
            identity: None,
            mood_label: Some(mood.as_str().to_string()),
            confidence,
        }
    }
}

/// One cycle's recognition result, normalised and stamped with the monotonic
/// capture time in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameObservation {
    pub identity: Option<String>,
    pub mood: Mood,
    pub confidence: f32,
    pub captured_at_ms: u64,
}

impl FrameObservation {
    pub fn present(identity: impl Into<String>, mood: Mood, captured_at_ms: u64) -> Self {
        Self {
            identity: Some(identity.into()),
            mood,
            confidence: 1.0,
            captured_at_ms,
        }
    }

    pub fn absent(captured_at_ms: u64) -> Self {
        Self {
            identity: None,
            mood: Mood::Neutral,
            confidence: 0.0,
            captured_at_ms,
        }
    }

    /// Builds the observation for a cycle. An unavailable collaborator (`None`)
    /// is indistinguishable from an empty frame. Blank identities count as absent,
    /// unknown mood labels become `Neutral` and confidence is clamped to `[0, 1]`.
    pub fn from_reading(reading: Option<PerceptionReading>, captured_at_ms: u64) -> Self {
        let Some(reading) = reading else {
            return Self::absent(captured_at_ms);
        };

        let identity = reading
            .identity
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let confidence = if reading.confidence.is_finite() {
            reading.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            identity,
            mood: Mood::parse_lenient(reading.mood_label.as_deref()),
            confidence,
            captured_at_ms,
        }
    }

    pub fn pair(&self) -> Option<MoodPair> {
        self.identity
            .as_ref()
            .map(|identity| MoodPair::new(identity.clone(), self.mood))
    }
}

/// An (identity, mood) combination, the unit both debouncing and timing key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPair {
    pub identity: String,
    pub mood: Mood,
}

impl MoodPair {
    pub fn new(identity: impl Into<String>, mood: Mood) -> Self {
        Self {
            identity: identity.into(),
            mood,
        }
    }

    pub fn matches(&self, identity: &str, mood: Mood) -> bool {
        self.identity == identity && self.mood == mood
    }
}
