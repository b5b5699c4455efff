//! In-memory searchable model (cache mode).
//!
//! Holds the authoritative row store and a filtered view over it. The view is
//! a list of store indices, recomputed from scratch whenever the pattern, the
//! match flags, or the store change. Structural edits always go to the store,
//! never to the view, so clearing the pattern recovers every row.

use async_trait::async_trait;
use tracing::{debug, trace, warn};

use crate::data::data_provider::{DataProvider, ModelEvent, SearchModel};
use crate::data::row::Row;
use crate::data::row_store::{RangeError, RowStore};
use crate::search::filter::{filter_indices, Matcher, PatternError};
use crate::search::pattern::SearchPattern;

#[derive(Debug, Default)]
pub struct SearchableModel {
    /// Unfiltered reference data; `None` until data is first set
    store: Option<RowStore>,
    pattern: SearchPattern,
    /// Compiled form of `pattern`, kept in sync by every setter
    matcher: Option<Matcher>,
    /// Store indices currently visible
    view: Vec<usize>,
    events: Vec<ModelEvent>,
}

impl SearchableModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Row>) -> Self {
        let mut model = Self::new();
        model.set_data(rows);
        model
    }

    /// Replace the authoritative content and re-derive the view
    pub fn set_data(&mut self, rows: Vec<Row>) {
        self.store
            .get_or_insert_with(RowStore::new)
            .replace_all(rows);
        self.refilter();
    }

    /// Insert rows into the full store before index `at`
    pub fn insert_rows(&mut self, rows: Vec<Row>, at: usize) -> Result<(), RangeError> {
        self.store_mut().insert(rows, at)?;
        self.refilter();
        Ok(())
    }

    /// Remove `count` rows of the full store starting at `start`
    pub fn remove_rows(&mut self, start: usize, count: usize) -> Result<(), RangeError> {
        self.store_mut().remove(start, count)?;
        self.refilter();
        Ok(())
    }

    /// Overwrite rows of the full store in place starting at `start`
    pub fn set_rows(&mut self, rows: Vec<Row>, start: usize) -> Result<(), RangeError> {
        self.store_mut().overwrite(rows, start)?;
        self.refilter();
        Ok(())
    }

    /// Number of rows before filtering
    pub fn full_row_count(&self) -> usize {
        self.store.as_ref().map_or(0, RowStore::len)
    }

    /// All rows before filtering
    pub fn full_rows(&self) -> &[Row] {
        self.store.as_ref().map(RowStore::rows).unwrap_or(&[])
    }

    /// Materialize the current view
    pub fn view_rows(&self) -> Vec<Row> {
        let rows = self.full_rows();
        self.view.iter().map(|&idx| rows[idx].clone()).collect()
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }

    pub fn anchor_front(&self) -> bool {
        self.pattern.anchored
    }

    pub fn search_as_regex(&self) -> bool {
        self.pattern.use_regex
    }

    fn store_mut(&mut self) -> &mut RowStore {
        self.store.get_or_insert_with(RowStore::new)
    }

    /// Swap in a new pattern if it compiles, then re-filter.
    /// A rejected pattern leaves pattern, matcher and view untouched.
    fn apply_pattern(&mut self, pattern: SearchPattern) -> Result<(), PatternError> {
        let matcher = Matcher::compile(&pattern).map_err(|e| {
            warn!(target: "SearchableModel", "Rejected search pattern: {}", e);
            e
        })?;

        debug!(target: "SearchableModel", "Applying search pattern {:?}", pattern);
        self.pattern = pattern;
        self.matcher = matcher;
        self.refilter();
        Ok(())
    }

    fn refilter(&mut self) {
        let Some(store) = self.store.as_ref() else {
            warn!(target: "SearchableModel", "No data to be searched through");
            return;
        };

        self.view = filter_indices(store.rows(), self.matcher.as_ref());
        trace!(
            target: "SearchableModel",
            "Filtered view holds {} of {} rows",
            self.view.len(),
            store.len()
        );
        self.events.push(ModelEvent::DataChanged);
    }
}

impl DataProvider for SearchableModel {
    fn get_row(&self, index: usize) -> Option<Row> {
        let store_idx = *self.view.get(index)?;
        self.store.as_ref()?.get(store_idx).cloned()
    }

    fn get_row_count(&self) -> usize {
        self.view.len()
    }
}

#[async_trait]
impl SearchModel for SearchableModel {
    fn set_search_pattern(&mut self, pattern: Option<String>) -> Result<bool, PatternError> {
        // Re-filter even for an unchanged pattern; the store may have moved on.
        let next = SearchPattern {
            text: pattern,
            ..self.pattern.clone()
        };
        self.apply_pattern(next)?;
        Ok(true)
    }

    fn search_pattern(&self) -> Option<&str> {
        self.pattern.text.as_deref()
    }

    fn set_anchor_front(&mut self, anchored: bool) -> Result<(), PatternError> {
        let next = self.pattern.clone().anchored(anchored);
        self.apply_pattern(next)
    }

    fn set_search_as_regex(&mut self, use_regex: bool) -> Result<(), PatternError> {
        let next = SearchPattern {
            use_regex,
            ..self.pattern.clone()
        };
        self.apply_pattern(next)
    }

    fn set_match_mode(&mut self, anchored: bool, use_regex: bool) -> Result<(), PatternError> {
        let next = SearchPattern {
            anchored,
            use_regex,
            ..self.pattern.clone()
        };
        self.apply_pattern(next)
    }

    fn take_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }
}
