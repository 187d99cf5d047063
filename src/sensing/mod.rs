pub mod controller;
pub mod loop_worker;
pub mod perception;
pub mod random;
pub mod scripted;

pub use controller::SensingController;
pub use loop_worker::{run_cycle, CycleContext, CycleOutcome, SharedEngine};
pub use perception::PerceptionSource;
pub use random::RandomPerception;
pub use scripted::ScriptedPerception;
