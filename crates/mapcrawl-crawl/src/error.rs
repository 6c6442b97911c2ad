use mapcrawl_core::{QueryTuple, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The data source failed with a non-quota error; the run was halted.
    #[error("data source failed on {tuple}: {source}")]
    Source {
        tuple: QueryTuple,
        #[source]
        source: SourceError,
    },
}
