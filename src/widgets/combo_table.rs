//! Combo controller: the consumer-facing half of the search widget.
//!
//! Raw text-change events go through the debouncer; the committed value
//! becomes the model's search pattern. Model notifications drive the
//! selection and the `loading` flag. All state changes happen on the caller's
//! task: `process_next` only waits for the next deadline or provider
//! completion and then applies it.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::data::data_provider::{ModelEvent, SearchModel};
use crate::remote::row_source::ProviderError;
use crate::search::filter::PatternError;
use crate::widgets::debouncer::Debouncer;
use crate::widgets::selection::{Selection, SelectionState};

/// Keys the controller reacts to; everything else belongs to the text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboKey {
    Up,
    Down,
    Enter,
    Escape,
    Tab,
}

/// What happened to a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Swallowed because a load is in flight
    Suppressed,
    Handled,
    /// Not consumed; the host should process it
    Ignored,
}

/// The currently selected row, as handed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRow {
    pub row_id: usize,
    pub key: String,
    pub value: String,
}

/// What `process_next` woke up for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// A debounced value was committed
    Committed,
    /// A provider completion arrived; `applied` is false when it was stale
    Completion { applied: bool },
}

#[derive(Debug)]
pub struct ComboTable<M: SearchModel> {
    model: M,
    debouncer: Debouncer,
    selection: SelectionState,
    /// Text currently in the input field
    value: Option<String>,
    /// Key of the row the user picked
    model_value: Option<String>,
    popup_open: bool,
    loading: bool,
    last_pattern_error: Option<PatternError>,
    last_load_error: Option<ProviderError>,
    disposed: bool,
}

impl<M: SearchModel> ComboTable<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, &SearchConfig::default())
    }

    pub fn with_config(model: M, config: &SearchConfig) -> Self {
        let mut combo = Self {
            model,
            debouncer: Debouncer::with_delay(Duration::from_millis(config.debounce_ms)),
            selection: SelectionState::new(),
            value: None,
            model_value: None,
            popup_open: false,
            loading: false,
            last_pattern_error: None,
            last_load_error: None,
            disposed: false,
        };
        combo.loading = combo.model.is_loading();
        // Events raised while the model was being filled are history by now
        combo.model.take_events();
        combo
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutate the model (e.g. load new rows) and react to what it publishes
    pub fn update_model<R>(&mut self, f: impl FnOnce(&mut M) -> R) -> R {
        let result = f(&mut self.model);
        self.dispatch_model_events();
        result
    }

    /// Configure both match flags and re-filter once.
    /// A rejected combination leaves flags and view as they were.
    pub fn set_match_mode(&mut self, anchored: bool, use_regex: bool) -> Result<(), PatternError> {
        let result = self.model.set_match_mode(anchored, use_regex);
        if let Err(e) = &result {
            warn!(target: "ComboTable", "Match mode rejected: {}", e);
            self.last_pattern_error = Some(e.clone());
        }
        self.dispatch_model_events();
        result
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn model_value(&self) -> Option<&str> {
        self.model_value.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.popup_open
    }

    pub fn open(&mut self) {
        self.popup_open = true;
    }

    pub fn close(&mut self) {
        self.popup_open = false;
    }

    pub fn row_count(&self) -> usize {
        self.model.get_row_count()
    }

    pub fn selection(&self) -> Selection {
        self.selection.selection()
    }

    pub fn last_pattern_error(&self) -> Option<&PatternError> {
        self.last_pattern_error.as_ref()
    }

    /// The failure of the latest load, cleared by the next commit or the
    /// next successful load
    pub fn last_load_error(&self) -> Option<&ProviderError> {
        self.last_load_error.as_ref()
    }

    /// Hand the pending load failure to the host, once
    pub fn take_load_error(&mut self) -> Option<ProviderError> {
        self.last_load_error.take()
    }

    pub fn is_commit_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Raw text-change event from the input field
    pub fn handle_input(&mut self, value: impl Into<String>) {
        self.handle_input_at(value, Instant::now());
    }

    pub fn handle_input_at(&mut self, value: impl Into<String>, now: Instant) {
        if self.disposed {
            return;
        }
        let value = value.into();
        debug!(target: "ComboTable", "Input changed to {:?}", value);

        self.popup_open = true;
        self.selection.clear();
        self.value = Some(value.clone());
        self.debouncer.trigger_at(value, now);
    }

    /// Commit the pending value if its deadline has passed.
    ///
    /// Returns whether a commit happened.
    pub fn poll_debounce_at(&mut self, now: Instant) -> Result<bool, PatternError> {
        match self.debouncer.poll_at(now) {
            Some(value) => self.commit(value_to_pattern(value)).map(|_| true),
            None => Ok(false),
        }
    }

    /// Cancel anything pending and commit `pattern` right away
    pub fn commit_now(&mut self, pattern: Option<String>) -> Result<(), PatternError> {
        if let Some(dropped) = self.debouncer.cancel() {
            debug!(target: "ComboTable", "Cancelled pending commit of {:?}", dropped);
        }
        self.commit(pattern)
    }

    /// Wait for the debounce deadline or the next provider completion,
    /// whichever comes first, and apply it.
    ///
    /// Returns `None` straight away when there is nothing to wait for.
    pub async fn process_next(&mut self) -> Option<Wake> {
        if !self.debouncer.is_pending() && !self.model.is_loading() {
            return None;
        }

        let wake = tokio::select! {
            value = self.debouncer.wait() => WakeSource::Deadline(value),
            applied = self.model.process_completion() => WakeSource::Completion(applied),
        };

        match wake {
            WakeSource::Deadline(value) => {
                // A bad pattern is recorded and logged; the view stays as it was.
                let _ = self.commit(value_to_pattern(value));
                Some(Wake::Committed)
            }
            WakeSource::Completion(applied) => {
                self.dispatch_model_events();
                Some(Wake::Completion { applied })
            }
        }
    }

    /// Keep processing until no commit or request is outstanding
    pub async fn settle(&mut self) {
        while self.process_next().await.is_some() {}
    }

    /// Ask the model to load rows `first..=last` of the view
    pub fn request_rows(&mut self, first: usize, last: usize) {
        self.model.request_rows(first, last);
        self.dispatch_model_events();
    }

    pub fn handle_key(&mut self, key: ComboKey) -> KeyOutcome {
        if self.loading {
            return KeyOutcome::Suppressed;
        }

        match key {
            ComboKey::Down | ComboKey::Up => {
                if !self.popup_open {
                    self.open();
                }
                if key == ComboKey::Down {
                    self.row_down();
                } else {
                    self.row_up();
                }
                KeyOutcome::Handled
            }
            ComboKey::Enter | ComboKey::Escape | ComboKey::Tab => {
                if !self.popup_open {
                    return KeyOutcome::Ignored;
                }
                if key == ComboKey::Enter {
                    self.apply_selected_row();
                }
                self.close();
                KeyOutcome::Handled
            }
        }
    }

    pub fn row_down(&mut self) -> bool {
        let row_count = self.row_count();
        self.selection.next(row_count)
    }

    pub fn row_up(&mut self) -> bool {
        let row_count = self.row_count();
        self.selection.previous(row_count)
    }

    /// Select a row of the view; out-of-range indices are ignored
    pub fn set_selection(&mut self, index: usize) -> bool {
        let row_count = self.row_count();
        self.selection.select(index, row_count)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_row_data(&self) -> Option<SelectedRow> {
        let row_id = self.selection.selected()?;
        let row = self.model.get_row(row_id)?;
        Some(SelectedRow {
            row_id,
            key: row.key().to_string(),
            value: row.text().to_string(),
        })
    }

    /// Copy the selected row into the model value and the input value
    pub fn apply_selected_row(&mut self) {
        match self.selected_row_data() {
            Some(row) => {
                debug!(target: "ComboTable", "Applying selected row {:?}", row);
                self.model_value = Some(row.key);
                self.value = Some(row.value);
            }
            None => {
                self.model_value = None;
                self.value = None;
            }
        }
    }

    /// Clear model value and input, and drop the filter immediately
    pub fn reset_value(&mut self) -> Result<(), PatternError> {
        self.model_value = None;
        self.value = None;
        self.commit_now(None)
    }

    /// Tear down: cancel any pending commit and ignore further input
    pub fn dispose(&mut self) {
        self.debouncer.cancel();
        self.disposed = true;
    }

    fn commit(&mut self, pattern: Option<String>) -> Result<(), PatternError> {
        debug!(target: "ComboTable", "Committing search pattern {:?}", pattern);
        self.last_load_error = None;
        let result = self.model.set_search_pattern(pattern);
        match &result {
            Ok(_) => self.last_pattern_error = None,
            Err(e) => {
                warn!(target: "ComboTable", "Search pattern rejected: {}", e);
                self.last_pattern_error = Some(e.clone());
            }
        }
        self.dispatch_model_events();
        result.map(|_| ())
    }

    fn dispatch_model_events(&mut self) {
        for event in self.model.take_events() {
            match event {
                ModelEvent::DataChanged => {
                    self.last_load_error = None;
                    let has_input = self.value.as_deref().is_some_and(|v| !v.is_empty());
                    let row_count = self.model.get_row_count();
                    self.selection.on_data_changed(has_input, row_count);
                }
                ModelEvent::LoadingChanged(loading) => {
                    self.loading = loading;
                }
                ModelEvent::LoadFailed(e) => {
                    warn!(target: "ComboTable", "Load failed: {}", e);
                    self.loading = self.model.is_loading();
                    self.last_load_error = Some(e);
                }
            }
        }
    }
}

impl<M: SearchModel> Drop for ComboTable<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

enum WakeSource {
    Deadline(String),
    Completion(bool),
}

fn value_to_pattern(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
