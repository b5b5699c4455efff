//! Data provider traits for abstracting row access
//!
//! These traits let the combo controller work with either the in-memory
//! searchable model or a paged remote model without knowing which one it has.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::data::row::Row;
use crate::remote::row_source::ProviderError;
use crate::search::filter::PatternError;

/// Notifications a model publishes to its consumer
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// The view was replaced or rows in it were (re)loaded
    DataChanged,
    /// A row-count or window request started or finished
    LoadingChanged(bool),
    /// A request for the current pattern failed; the last good view stays
    LoadFailed(ProviderError),
}

/// Core trait for read-only row access
///
/// This is the minimal interface a renderer needs.
pub trait DataProvider: Debug {
    /// Get a single row of the current view.
    /// Returns None if the index is out of bounds or not loaded yet.
    fn get_row(&self, index: usize) -> Option<Row>;

    /// Get the number of rows in the current view
    fn get_row_count(&self) -> usize;

    /// Get multiple rows for efficient rendering
    fn get_visible_rows(&self, start: usize, count: usize) -> Vec<Row> {
        let end = start.saturating_add(count).min(self.get_row_count());

        (start..end).filter_map(|i| self.get_row(i)).collect()
    }

    /// Get a single cell value
    fn get_cell_value(&self, row: usize, col: usize) -> Option<String> {
        self.get_row(row)
            .and_then(|r| r.cell(col).map(str::to_string))
    }
}

/// A provider whose view is driven by a search pattern
#[async_trait]
pub trait SearchModel: DataProvider + Send {
    /// Commit a new pattern text. `Ok(false)` when nothing had to change.
    fn set_search_pattern(&mut self, pattern: Option<String>) -> Result<bool, PatternError>;

    fn search_pattern(&self) -> Option<&str>;

    fn set_anchor_front(&mut self, anchored: bool) -> Result<(), PatternError>;

    fn set_search_as_regex(&mut self, use_regex: bool) -> Result<(), PatternError>;

    /// Set both match flags at once. On error neither flag changes.
    fn set_match_mode(&mut self, anchored: bool, use_regex: bool) -> Result<(), PatternError>;

    /// True while a count or window request is outstanding
    fn is_loading(&self) -> bool {
        false
    }

    /// Make sure rows `first..=last` of the view get loaded.
    /// Fully materialized models have nothing to do.
    fn request_rows(&mut self, _first: usize, _last: usize) {}

    /// Drain notifications published since the last call
    fn take_events(&mut self) -> Vec<ModelEvent>;

    /// Wait for the next provider completion and apply it.
    ///
    /// Returns whether the completion was applied (false for stale ones).
    /// Models without asynchronous requests never resolve.
    async fn process_completion(&mut self) -> bool {
        std::future::pending::<bool>().await
    }
}
