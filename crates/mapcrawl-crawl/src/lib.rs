//! Sequential, quota-aware crawl over `(city, zone, category)` tuples.
//!
//! [`CrawlController`] walks every tuple in a fixed order, asks a
//! [`mapcrawl_core::BusinessSource`] for businesses, and folds the answers
//! into a deduplicated [`Accumulator`]. Quota failures cool down and retry the
//! same tuple indefinitely; any other failure ends the run.

pub mod controller;
pub mod error;
pub mod merge;
pub mod progress;
pub mod state;
pub mod stop;

pub use controller::{CrawlController, CrawlSettings, RunSummary};
pub use error::CrawlError;
pub use merge::{merge, Accumulator};
pub use progress::{CrawlEvent, LogReporter, ProgressReporter, ProgressSnapshot, SilentReporter};
pub use state::{RunState, TupleStep};
pub use stop::StopSignal;
