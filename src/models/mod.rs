//! Domain values that flow between perception, the engine and the sinks.

pub mod log_entry;
pub mod mood;
pub mod observation;

pub use log_entry::LogEntry;
pub use mood::Mood;
pub use observation::{FrameObservation, MoodPair, PerceptionReading};
