//! Progress events pushed by the crawl controller.

use mapcrawl_core::QueryTuple;

use crate::state::RunState;

/// What the crawl is working on, published before each tuple's first query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub current_city: String,
    pub current_zone: String,
    pub current_category: String,
    pub total_found: usize,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn new(tuple: &QueryTuple, total_found: usize) -> Self {
        Self {
            current_city: tuple.city.clone(),
            current_zone: tuple.zone.to_string(),
            current_category: tuple.category.clone(),
            total_found,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CrawlEvent<'a> {
    /// A tuple is about to be queried for the first time. Quota retries of
    /// the same tuple do not repeat this event.
    TupleStarted {
        index: usize,
        total: usize,
        snapshot: &'a ProgressSnapshot,
    },
    StateChanged(&'a RunState),
    RecordsMerged { added: usize, total: usize },
}

/// Passive sink for crawl progress.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: CrawlEvent<'_>);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn report(&self, _event: CrawlEvent<'_>) {}
}

/// Emits every event as a structured `tracing` record.
///
/// Cooldown ticks are logged at `debug` except every tenth second so a long
/// wait stays visible at `info` without flooding it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, event: CrawlEvent<'_>) {
        match event {
            CrawlEvent::TupleStarted {
                index,
                total,
                snapshot,
            } => tracing::info!(
                tuple = index + 1,
                of = total,
                city = %snapshot.current_city,
                zone = %snapshot.current_zone,
                category = %snapshot.current_category,
                total_found = snapshot.total_found,
                "querying"
            ),
            CrawlEvent::StateChanged(RunState::WaitingOnQuota(secs)) => {
                if *secs % 10 == 0 {
                    tracing::info!(seconds_remaining = *secs, "quota exhausted; cooling down");
                } else {
                    tracing::debug!(seconds_remaining = *secs, "quota cooldown");
                }
            }
            CrawlEvent::StateChanged(RunState::Failed(message)) => {
                tracing::error!(error = %message, "crawl failed");
            }
            CrawlEvent::StateChanged(state) => tracing::debug!(%state, "crawl state changed"),
            CrawlEvent::RecordsMerged { added, total } => {
                tracing::info!(added, total, "merged records");
            }
        }
    }
}

impl<R: ProgressReporter + ?Sized> ProgressReporter for &R {
    fn report(&self, event: CrawlEvent<'_>) {
        (**self).report(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use mapcrawl_core::Zone;

    use super::*;

    #[derive(Default)]
    struct Counting(Mutex<usize>);

    impl ProgressReporter for Counting {
        fn report(&self, _event: CrawlEvent<'_>) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn snapshot_copies_tuple_fields() {
        let tuple = QueryTuple::new("Konya", Zone::Districts, "Dental Clinic");
        let snapshot = ProgressSnapshot::new(&tuple, 12);
        assert_eq!(snapshot.current_city, "Konya");
        assert_eq!(snapshot.current_zone, "Districts");
        assert_eq!(snapshot.current_category, "Dental Clinic");
        assert_eq!(snapshot.total_found, 12);
    }

    #[test]
    fn reporter_by_reference_forwards_events() {
        fn emit_two<R: ProgressReporter>(reporter: R) {
            reporter.report(CrawlEvent::RecordsMerged { added: 1, total: 1 });
            reporter.report(CrawlEvent::StateChanged(&RunState::Idle));
        }

        let counting = Counting::default();
        emit_two(&counting);
        assert_eq!(*counting.0.lock().unwrap(), 2);
    }

    #[test]
    fn silent_and_log_reporters_accept_every_event() {
        let tuple = QueryTuple::new("Rize", Zone::Center, "Dentist");
        let snapshot = ProgressSnapshot::new(&tuple, 0);
        let states = [
            RunState::Running,
            RunState::WaitingOnQuota(60),
            RunState::WaitingOnQuota(7),
            RunState::Failed("boom".to_owned()),
        ];
        for reporter in [&SilentReporter as &dyn ProgressReporter, &LogReporter] {
            reporter.report(CrawlEvent::TupleStarted {
                index: 0,
                total: 1,
                snapshot: &snapshot,
            });
            for state in &states {
                reporter.report(CrawlEvent::StateChanged(state));
            }
            reporter.report(CrawlEvent::RecordsMerged { added: 0, total: 0 });
        }
    }
}
