use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timing breakdown of one processing cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub timestamp: DateTime<Utc>,
    pub perception_ms: u64,
    pub engine_ms: u64,
    pub sink_ms: u64,
    pub total_ms: u64,
    pub identity_present: bool,
    pub logged: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub recent_cycles: Vec<CycleMetrics>,
    pub cycle_count: u64,
    pub present_count: u64,
    pub empty_count: u64,
    pub log_count: u64,
    pub average_cycle_ms: f64,
}
