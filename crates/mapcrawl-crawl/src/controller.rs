//! The crawl controller: one sequential pass over every query tuple.
//!
//! Tuples are visited city-major, then zone, then category. Each tuple runs a
//! small state machine ([`TupleStep`]) that retries the same query forever on
//! quota failures, counting the cooldown down one second at a time, and ends
//! the whole run on any other failure. The stop flag is polled at the head of
//! every loop, before every query attempt, and between cooldown ticks.

use std::time::Duration;

use mapcrawl_core::{AppConfig, BusinessSource, LatLng, QueryTuple, Record, Targets, Zone};

use crate::error::CrawlError;
use crate::merge::Accumulator;
use crate::progress::{CrawlEvent, ProgressReporter, ProgressSnapshot};
use crate::state::{RunState, TupleStep};
use crate::stop::StopSignal;

const COOLDOWN_TICK: Duration = Duration::from_secs(1);

/// Timing knobs for a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Pause after every successful tuple, whether or not it found anything.
    pub inter_query_delay: Duration,
    /// Seconds to wait after a quota failure before retrying the tuple.
    pub quota_cooldown_secs: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            inter_query_delay: Duration::from_secs(3),
            quota_cooldown_secs: 60,
        }
    }
}

impl CrawlSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            inter_query_delay: Duration::from_millis(config.inter_query_delay_ms),
            quota_cooldown_secs: config.quota_cooldown_secs,
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// `Idle` when every tuple was visited, `Stopped` when cancelled.
    pub state: RunState,
    pub tuples_completed: usize,
    pub records_added: usize,
    pub total_records: usize,
}

enum TupleOutcome {
    Completed { added: usize },
    Cancelled,
    Fatal(mapcrawl_core::SourceError),
}

enum Traversal {
    Exhausted,
    Cancelled,
}

pub struct CrawlController<S, R> {
    source: S,
    reporter: R,
    targets: Targets,
    settings: CrawlSettings,
    accumulator: Accumulator,
    state: RunState,
    stop: StopSignal,
    tuples_completed: usize,
    records_added: usize,
}

impl<S, R> CrawlController<S, R>
where
    S: BusinessSource,
    R: ProgressReporter,
{
    #[must_use]
    pub fn new(
        source: S,
        reporter: R,
        targets: Targets,
        settings: CrawlSettings,
        accumulator: Accumulator,
    ) -> Self {
        Self {
            source,
            reporter,
            targets,
            settings,
            accumulator,
            state: RunState::Idle,
            stop: StopSignal::new(),
            tuples_completed: 0,
            records_added: 0,
        }
    }

    /// Use `stop` as the cancellation flag instead of a private one.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.accumulator.records()
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// A handle that can request cancellation from another task.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Request cooperative cancellation of the current run.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Clear the collection and its backup.
    pub fn reset(&mut self) {
        self.accumulator.clear();
        tracing::info!("record collection reset");
    }

    /// Walk every tuple from the first city.
    ///
    /// Returns a summary in state `Idle` when all tuples were visited or
    /// `Stopped` when cancelled. Records merged before a stop or failure are
    /// kept.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::Source`] when the source fails with anything
    /// other than a quota error; the controller is then in `Failed`.
    pub async fn start(&mut self, location: Option<LatLng>) -> Result<RunSummary, CrawlError> {
        self.stop.reset();
        self.tuples_completed = 0;
        self.records_added = 0;
        self.set_state(RunState::Running);
        tracing::info!(
            tuples = self.targets.tuple_count(),
            existing = self.accumulator.len(),
            "crawl started"
        );

        let final_state = match self.traverse(location).await? {
            Traversal::Exhausted => RunState::Idle,
            Traversal::Cancelled => RunState::Stopped,
        };
        self.set_state(final_state.clone());

        let summary = RunSummary {
            state: final_state,
            tuples_completed: self.tuples_completed,
            records_added: self.records_added,
            total_records: self.accumulator.len(),
        };
        tracing::info!(
            state = %summary.state,
            tuples_completed = summary.tuples_completed,
            records_added = summary.records_added,
            total_records = summary.total_records,
            "crawl finished"
        );
        Ok(summary)
    }

    async fn traverse(&mut self, location: Option<LatLng>) -> Result<Traversal, CrawlError> {
        let targets = self.targets.clone();
        let total = targets.tuple_count();
        let mut index = 0;

        for city in &targets.cities {
            if self.stop.is_stopped() {
                return Ok(Traversal::Cancelled);
            }
            for zone in Zone::ALL {
                if self.stop.is_stopped() {
                    return Ok(Traversal::Cancelled);
                }
                for category in &targets.categories {
                    if self.stop.is_stopped() {
                        return Ok(Traversal::Cancelled);
                    }

                    let tuple = QueryTuple::new(city.clone(), zone, category.clone());
                    let snapshot = ProgressSnapshot::new(&tuple, self.accumulator.len());
                    self.reporter.report(CrawlEvent::TupleStarted {
                        index,
                        total,
                        snapshot: &snapshot,
                    });

                    match self.run_tuple(&tuple, location).await {
                        TupleOutcome::Completed { added } => {
                            self.tuples_completed += 1;
                            self.records_added += added;
                        }
                        TupleOutcome::Cancelled => return Ok(Traversal::Cancelled),
                        TupleOutcome::Fatal(source) => {
                            tracing::error!(%tuple, error = %source, "halting crawl");
                            self.set_state(RunState::Failed(source.to_string()));
                            return Err(CrawlError::Source { tuple, source });
                        }
                    }
                    index += 1;
                }
            }
        }

        Ok(Traversal::Exhausted)
    }

    /// Drive one tuple's [`TupleStep`] machine to a terminal outcome.
    async fn run_tuple(&mut self, tuple: &QueryTuple, location: Option<LatLng>) -> TupleOutcome {
        let mut step = TupleStep::Querying;
        loop {
            step = match step {
                TupleStep::Querying => {
                    if self.stop.is_stopped() {
                        return TupleOutcome::Cancelled;
                    }
                    match self.source.fetch(tuple, location).await {
                        Ok(records) => {
                            let found = records.len();
                            let added = self.accumulator.absorb(records);
                            tracing::debug!(%tuple, found, added, "tuple answered");
                            self.reporter.report(CrawlEvent::RecordsMerged {
                                added,
                                total: self.accumulator.len(),
                            });
                            TupleStep::Succeeded(added)
                        }
                        Err(e) if e.is_quota() => {
                            tracing::warn!(%tuple, error = %e, cooldown_secs = self.settings.quota_cooldown_secs, "quota exceeded; will retry");
                            TupleStep::CoolingDown(self.settings.quota_cooldown_secs)
                        }
                        Err(e) => TupleStep::FatalError(e),
                    }
                }
                TupleStep::CoolingDown(0) => {
                    self.set_state(RunState::Running);
                    TupleStep::Querying
                }
                TupleStep::CoolingDown(secs) => {
                    if self.stop.is_stopped() {
                        // Abandon the countdown; the retry check sees the flag.
                        TupleStep::CoolingDown(0)
                    } else {
                        self.set_state(RunState::WaitingOnQuota(secs));
                        tokio::time::sleep(COOLDOWN_TICK).await;
                        TupleStep::CoolingDown(secs - 1)
                    }
                }
                TupleStep::Succeeded(added) => {
                    tokio::time::sleep(self.settings.inter_query_delay).await;
                    return TupleOutcome::Completed { added };
                }
                TupleStep::FatalError(e) => return TupleOutcome::Fatal(e),
            };
        }
    }

    fn set_state(&mut self, state: RunState) {
        if self.state != state {
            self.state = state;
            self.reporter.report(CrawlEvent::StateChanged(&self.state));
        }
    }
}
