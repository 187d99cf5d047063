pub mod controller;
pub mod events;

pub use controller::{recover_interrupted_sessions, SessionController};
pub use events::{EngineEvent, EventSink};
