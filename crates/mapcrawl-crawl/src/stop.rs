use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between the controller and whoever
/// may ask it to stop.
///
/// Stopping is advisory: the controller polls the flag at loop heads and
/// between cooldown ticks, so an in-flight request or sleep finishes first.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear a previous request; called when a new run starts.
    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
