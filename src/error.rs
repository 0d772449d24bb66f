use crate::datasource::SourceError;
use crate::engine::{AggregationError, FetchError, ImportError};
use crate::report::ReportError;
use thiserror::Error;

/// Run-level error: any fatal failure surfaced by the batch pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
    #[error(transparent)]
    Report(#[from] ReportError),
}
