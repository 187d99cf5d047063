use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

/// Time source injected into the engine.
///
/// `now_ms` must never go backwards; elapsed-time bookkeeping is built on it.
/// `wall_now` is only used to stamp records for humans.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;

    fn wall_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Milliseconds since construction, backed by `Instant`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock. Clones share the same reading.
///
/// Wall time is derived from a fixed base plus the monotonic reading, so records
/// stay deterministic.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
    wall_base: DateTime<Utc>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
            wall_base: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn with_wall_base(start_ms: u64, wall_base: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
            wall_base,
        }
    }

    /// Moves the clock to `ms`. Earlier values are ignored.
    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) -> u64 {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn wall_now(&self) -> DateTime<Utc> {
        let offset = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        self.wall_base + Duration::milliseconds(offset)
    }
}
