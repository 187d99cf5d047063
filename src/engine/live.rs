use serde::Serialize;

use crate::models::{FrameObservation, Mood};

const FPS_WINDOW_MS: u64 = 1_000;

/// What the perception stream showed on the most recent cycle, plus the
/// measured cycle rate. Maintained in and out of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStatus {
    pub identity: Option<String>,
    pub mood: Option<Mood>,
    pub confidence: Option<f32>,
    pub cycles_per_second: u32,
    pub last_cycle_at_ms: Option<u64>,
}

/// Counts cycles and publishes the count once per elapsed second.
#[derive(Debug, Default)]
pub(crate) struct FpsMeter {
    window_start_ms: Option<u64>,
    frames: u32,
}

impl FpsMeter {
    /// Records one cycle and returns the fresh rate when a window closes.
    pub(crate) fn tick(&mut self, now_ms: u64) -> Option<u32> {
        self.frames = self.frames.saturating_add(1);
        let start = *self.window_start_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(start) >= FPS_WINDOW_MS {
            let rate = self.frames;
            self.frames = 0;
            self.window_start_ms = Some(now_ms);
            Some(rate)
        } else {
            None
        }
    }
}

impl LiveStatus {
    pub(crate) fn record(&mut self, obs: &FrameObservation, fps: Option<u32>) {
        if obs.confidence > 0.0 || obs.identity.is_some() {
            self.mood = Some(obs.mood);
            self.confidence = Some(obs.confidence);
        } else {
            self.mood = None;
            self.confidence = None;
        }
        self.identity = obs.identity.clone();
        self.last_cycle_at_ms = Some(obs.captured_at_ms);
        if let Some(rate) = fps {
            self.cycles_per_second = rate;
        }
    }
}
