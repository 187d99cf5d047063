//! Debounced logging and time-in-mood bookkeeping.
//!
//! The filter decides when a recognized (identity, mood) pair is stable enough
//! to log; the accumulator credits raw per-cycle presence to the ledger; the
//! engine ties both to a single session window.

pub mod accumulator;
pub mod config;
pub mod error;
pub mod filter;
pub mod ledger;
pub mod live;
pub mod mood_engine;
pub mod state;

pub use accumulator::{DurationAccumulator, OpenInterval};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use filter::{ConfirmationFilter, PendingCandidate};
pub use ledger::{DurationLedger, MoodDurations};
pub use live::LiveStatus;
pub use mood_engine::{CompletedSession, EngineSnapshot, MoodEngine};
pub use state::{SessionState, SessionStatus};
