use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::engine::MoodEngine;
use crate::metrics::{CycleMetrics, MetricsCollector};
use crate::models::{FrameObservation, LogEntry, PerceptionReading};
use crate::session::events::{EngineEvent, EventSink};

use super::perception::PerceptionSource;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

const SLOW_CYCLE_WARN_MS: u64 = 1_000;

pub type SharedEngine = Arc<Mutex<MoodEngine>>;

/// Everything a cycle touches besides the perception source.
#[derive(Clone)]
pub struct CycleContext {
    pub engine: SharedEngine,
    pub sink: EventSink,
    pub metrics: MetricsCollector,
    pub heartbeat_every_cycles: u32,
}

#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub identity_present: bool,
    pub entry: Option<LogEntry>,
}

/// Polls `source` once per cycle until cancelled.
///
/// Each cycle runs to completion (perception, engine, sinks) before the next
/// one is scheduled `cycle_delay` after it finished, so a slow recognizer
/// stretches the period instead of stacking cycles.
pub async fn cycle_loop(
    ctx: CycleContext,
    mut source: Box<dyn PerceptionSource>,
    cycle_delay: Duration,
    cancel_token: CancellationToken,
) {
    log_info!(
        "cycle loop started with {} source, delay {}ms",
        source.name(),
        cycle_delay.as_millis()
    );
    let mut ticks: u32 = 0;

    loop {
        if cancel_token.is_cancelled() {
            break;
        }

        let perception_start = Instant::now();
        let sampled = tokio::task::spawn_blocking(move || {
            let reading = source.sample();
            (source, reading)
        })
        .await;
        let reading = match sampled {
            Ok((returned, reading)) => {
                source = returned;
                reading
            }
            Err(err) => {
                log_error!("perception worker failed, stopping cycle loop: {err}");
                break;
            }
        };
        let perception_ms = perception_start.elapsed().as_millis() as u64;

        ticks = ticks.wrapping_add(1);
        let heartbeat = ticks % ctx.heartbeat_every_cycles.max(1) == 0;

        match run_cycle(&ctx, reading, perception_ms, heartbeat).await {
            Ok(outcome) => {
                if let Some(entry) = outcome.entry {
                    log_info!("{}", entry.display_line());
                }
            }
            Err(err) => log_error!("cycle failed: {err:?}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(cycle_delay) => {}
            _ = cancel_token.cancelled() => break,
        }
    }

    log_info!("cycle loop shutting down");
}

/// Feeds one reading through the engine and the sinks.
///
/// The engine lock is held for the whole cycle, so session start/stop only
/// ever land between cycles.
pub async fn run_cycle(
    ctx: &CycleContext,
    reading: Option<PerceptionReading>,
    perception_ms: u64,
    heartbeat: bool,
) -> Result<CycleOutcome> {
    let cycle_start = Instant::now();
    let mut engine = ctx.engine.lock().await;

    let engine_start = Instant::now();
    let obs = FrameObservation::from_reading(reading, engine.now_ms());
    let entry = engine.observe(&obs);
    let engine_ms = engine_start.elapsed().as_millis() as u64;

    let sink_start = Instant::now();
    let sink_result = match &entry {
        Some(entry) => {
            let session_id = engine.session().session_id.clone();
            ctx.sink.log_entry(session_id.as_deref(), entry).await
        }
        None => Ok(()),
    };
    if heartbeat {
        let snapshot = engine.snapshot();
        log_debug!(
            "heartbeat: {} cycles/s, tracked {}ms",
            snapshot.live.cycles_per_second,
            snapshot.tracked_ms
        );
        ctx.sink.emit(EngineEvent::Heartbeat(snapshot));
    }
    drop(engine);
    let sink_ms = sink_start.elapsed().as_millis() as u64;

    let total_ms = perception_ms + cycle_start.elapsed().as_millis() as u64;
    if total_ms > SLOW_CYCLE_WARN_MS {
        log_warn!(
            "slow cycle: {}ms (perception: {}ms, engine: {}ms, sinks: {}ms)",
            total_ms,
            perception_ms,
            engine_ms,
            sink_ms
        );
    }

    ctx.metrics
        .record_cycle(CycleMetrics {
            timestamp: Utc::now(),
            perception_ms,
            engine_ms,
            sink_ms,
            total_ms,
            identity_present: obs.identity.is_some(),
            logged: entry.is_some(),
        })
        .await;

    sink_result?;
    Ok(CycleOutcome {
        identity_present: obs.identity.is_some(),
        entry,
    })
}
