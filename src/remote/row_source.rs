//! The backend boundary of the remote model.
//!
//! A `RowSource` answers two questions for a pattern: roughly how many rows
//! match, and what rows `first..=last` of that match set are. Anything that
//! can answer those (a simulation, an HTTP service, a database cursor) can sit
//! behind the remote model.

use async_trait::async_trait;
use thiserror::Error;

use crate::data::row::Row;
use crate::search::pattern::SearchPattern;

/// A count or window request for the current generation failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("row count request (generation {generation}) failed: {message}")]
    RowCount { generation: u64, message: String },

    #[error("rows {first}..={last} request (generation {generation}) failed: {message}")]
    Rows {
        generation: u64,
        first: usize,
        last: usize,
        message: String,
    },
}

#[async_trait]
pub trait RowSource: Send + Sync {
    /// Estimate how many rows match `pattern` before any row is produced
    async fn estimate_count(&self, pattern: &SearchPattern) -> anyhow::Result<usize>;

    /// Produce exactly `last - first + 1` rows of the match set for `pattern`.
    ///
    /// Row keys are `first, first + 1, ...`; cell 1 holds the searchable text.
    async fn load_window(
        &self,
        pattern: &SearchPattern,
        first: usize,
        last: usize,
    ) -> anyhow::Result<Vec<Row>>;
}
