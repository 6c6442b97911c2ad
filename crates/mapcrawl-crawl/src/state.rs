use mapcrawl_core::SourceError;

/// Observable state of the crawl as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Cooling down after a quota failure; seconds left before the retry.
    WaitingOnQuota(u32),
    Stopped,
    Failed(String),
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::WaitingOnQuota(secs) => write!(f, "waiting on quota ({secs}s)"),
            RunState::Stopped => write!(f, "stopped"),
            RunState::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Per-tuple retry machine.
///
/// `Querying` → `Succeeded` on success, → `CoolingDown(cooldown)` on a quota
/// failure, → `FatalError` on anything else. `CoolingDown(0)` goes back to
/// `Querying` for the same tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TupleStep {
    Querying,
    CoolingDown(u32),
    Succeeded(usize),
    FatalError(SourceError),
}
