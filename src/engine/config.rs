use serde::{Deserialize, Serialize};

pub const DEFAULT_HOLD_MS: u64 = 3_000;
pub const DEFAULT_CYCLE_DELAY_MS: u64 = 120;

/// Tunables for the engine and the cycle loop that feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// How long an (identity, mood) pair must hold before it is logged.
    pub hold_ms: u64,
    /// Pause between the end of one cycle and the start of the next.
    pub cycle_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hold_ms: DEFAULT_HOLD_MS,
            cycle_delay_ms: DEFAULT_CYCLE_DELAY_MS,
        }
    }
}
