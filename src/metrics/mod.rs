mod types;

pub use types::{CycleMetrics, MetricsSnapshot};

use std::sync::Arc;
use tokio::sync::Mutex;

const MAX_RECENT_CYCLES: usize = 20;

/// Rolling statistics about the cycle loop, shared between the loop and readers.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsState>>,
}

#[derive(Default)]
struct MetricsState {
    recent_cycles: Vec<CycleMetrics>,
    cycle_count: u64,
    present_count: u64,
    empty_count: u64,
    log_count: u64,
    total_cycle_ms: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_cycle(&self, metrics: CycleMetrics) {
        let mut state = self.inner.lock().await;

        state.cycle_count += 1;
        state.total_cycle_ms = state.total_cycle_ms.saturating_add(metrics.total_ms);
        if metrics.identity_present {
            state.present_count += 1;
        } else {
            state.empty_count += 1;
        }
        if metrics.logged {
            state.log_count += 1;
        }

        state.recent_cycles.push(metrics);
        if state.recent_cycles.len() > MAX_RECENT_CYCLES {
            state.recent_cycles.remove(0);
        }
    }

    pub async fn get_snapshot(&self) -> MetricsSnapshot {
        let state = self.inner.lock().await;
        let average_cycle_ms = if state.cycle_count == 0 {
            0.0
        } else {
            state.total_cycle_ms as f64 / state.cycle_count as f64
        };

        MetricsSnapshot {
            recent_cycles: state.recent_cycles.clone(),
            cycle_count: state.cycle_count,
            present_count: state.present_count,
            empty_count: state.empty_count,
            log_count: state.log_count,
            average_cycle_ms,
        }
    }

    pub async fn reset(&self) {
        let mut state = self.inner.lock().await;
        *state = MetricsState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cycle(total_ms: u64, identity_present: bool, logged: bool) -> CycleMetrics {
        CycleMetrics {
            timestamp: Utc::now(),
            perception_ms: 0,
            engine_ms: 0,
            sink_ms: 0,
            total_ms,
            identity_present,
            logged,
        }
    }

    #[tokio::test]
    async fn counts_and_caps_recent_cycles() {
        let metrics = MetricsCollector::new();
        for i in 0..25u64 {
            metrics.record_cycle(cycle(i, i % 2 == 0, i == 3)).await;
        }

        let snapshot = metrics.get_snapshot().await;
        assert_eq!(snapshot.cycle_count, 25);
        assert_eq!(snapshot.present_count, 13);
        assert_eq!(snapshot.empty_count, 12);
        assert_eq!(snapshot.log_count, 1);
        assert_eq!(snapshot.recent_cycles.len(), MAX_RECENT_CYCLES);
        assert_eq!(snapshot.recent_cycles[0].total_ms, 5);
        assert!((snapshot.average_cycle_ms - 12.0).abs() < 1e-9);

        metrics.reset().await;
        assert_eq!(metrics.get_snapshot().await.cycle_count, 0);
    }
}
