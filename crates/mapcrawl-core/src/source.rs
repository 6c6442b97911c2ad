//! The data-source seam the crawl controller queries once per tuple.

use std::future::Future;

use thiserror::Error;

use crate::record::{LatLng, QueryTuple, Record};

/// Failure reported by a [`BusinessSource`].
///
/// Only [`SourceError::QuotaExceeded`] is recoverable; the controller treats
/// every other variant as fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    Failed(String),
}

impl SourceError {
    #[must_use]
    pub fn is_quota(&self) -> bool {
        matches!(self, SourceError::QuotaExceeded(_))
    }
}

/// Something that can enumerate businesses for one query tuple.
pub trait BusinessSource {
    /// Fetch candidate records for `tuple`, optionally biased towards `location`.
    fn fetch(
        &self,
        tuple: &QueryTuple,
        location: Option<LatLng>,
    ) -> impl Future<Output = Result<Vec<Record>, SourceError>> + Send;
}
