use crate::models::PerceptionReading;

/// The recognition collaborator, polled once per cycle.
///
/// `None` means no face, or that the collaborator is unavailable; the engine
/// treats both the same way. Implementations may block.
pub trait PerceptionSource: Send + 'static {
    fn sample(&mut self) -> Option<PerceptionReading>;

    fn name(&self) -> &str {
        "perception"
    }
}

impl<F> PerceptionSource for F
where
    F: FnMut() -> Option<PerceptionReading> + Send + 'static,
{
    fn sample(&mut self) -> Option<PerceptionReading> {
        self()
    }
}
