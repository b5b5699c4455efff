//! Paged model over a `RowSource`.
//!
//! The row count is requested first; rows are then fetched block by block as
//! the consumer asks for them. Every request carries the generation that was
//! current when it was issued. Committing a pattern (or reloading) bumps the
//! generation, and completions from older generations are dropped unseen.
//!
//! The rows on display stay those of the last pattern whose count loaded.
//! A new pattern only replaces them once its own count arrives; if that
//! request fails, the model falls back to the pattern still on display.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::data::data_provider::{DataProvider, ModelEvent, SearchModel};
use crate::data::row::Row;
use crate::remote::row_source::{ProviderError, RowSource};
use crate::search::filter::{Matcher, PatternError};
use crate::search::pattern::SearchPattern;

pub const DEFAULT_BLOCK_SIZE: usize = 50;
pub const DEFAULT_MAX_CACHED_BLOCKS: usize = 15;

/// What a finished request carries back
#[derive(Debug)]
pub enum CompletionKind {
    RowCount(anyhow::Result<usize>),
    Rows {
        first: usize,
        last: usize,
        result: anyhow::Result<Vec<Row>>,
    },
}

/// A finished request, labeled with the generation it was issued under
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub kind: CompletionKind,
}

pub struct RemoteTableModel {
    source: Arc<dyn RowSource>,
    /// Most recently committed pattern
    pattern: SearchPattern,
    /// Pattern that `row_count` and the cached blocks belong to
    loaded_pattern: SearchPattern,
    /// A count for `pattern` is on its way; no block requests meanwhile
    count_pending: bool,
    generation: u64,
    row_count: usize,
    block_size: usize,
    max_cached_blocks: usize,
    blocks: HashMap<usize, Vec<Row>>,
    /// Cached block indices, oldest first
    block_order: VecDeque<usize>,
    pending_blocks: HashSet<usize>,
    /// Requests of the current generation still in flight
    outstanding: usize,
    loading: bool,
    events: Vec<ModelEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

impl fmt::Debug for RemoteTableModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTableModel")
            .field("pattern", &self.pattern)
            .field("loaded_pattern", &self.loaded_pattern)
            .field("generation", &self.generation)
            .field("row_count", &self.row_count)
            .field("cached_blocks", &self.block_order.len())
            .field("outstanding", &self.outstanding)
            .finish()
    }
}

impl RemoteTableModel {
    pub fn new(source: Arc<dyn RowSource>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            source,
            pattern: SearchPattern::default(),
            loaded_pattern: SearchPattern::default(),
            count_pending: false,
            generation: 0,
            row_count: 0,
            block_size: DEFAULT_BLOCK_SIZE,
            max_cached_blocks: DEFAULT_MAX_CACHED_BLOCKS,
            blocks: HashMap::new(),
            block_order: VecDeque::new(),
            pending_blocks: HashSet::new(),
            outstanding: 0,
            loading: false,
            events: Vec::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_max_cached_blocks(mut self, max_cached_blocks: usize) -> Self {
        self.max_cached_blocks = max_cached_blocks.max(1);
        self
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pattern(&self) -> &SearchPattern {
        &self.pattern
    }

    /// The pattern whose rows are currently on display
    pub fn loaded_pattern(&self) -> &SearchPattern {
        &self.loaded_pattern
    }

    pub fn cached_block_count(&self) -> usize {
        self.block_order.len()
    }

    /// Ask for a fresh count of the current pattern. Rows already on display
    /// stay until the count arrives; requests still in flight are abandoned.
    ///
    /// Must be called from within a tokio runtime.
    pub fn reload_data(&mut self) {
        self.generation += 1;
        self.pending_blocks.clear();
        self.outstanding = 0;
        self.count_pending = true;
        debug!(
            target: "RemoteTableModel",
            "Reloading generation {} for {:?}",
            self.generation,
            self.pattern.text
        );

        let source = Arc::clone(&self.source);
        let pattern = self.pattern.clone();
        self.spawn_request(async move {
            CompletionKind::RowCount(source.estimate_count(&pattern).await)
        });
    }

    /// Apply one completion; stale generations are discarded.
    ///
    /// Returns whether the completion changed the model.
    pub fn apply_completion(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                target: "RemoteTableModel",
                "Discarding stale completion of generation {} (current {})",
                completion.generation,
                self.generation
            );
            return false;
        }

        self.outstanding = self.outstanding.saturating_sub(1);
        match completion.kind {
            CompletionKind::RowCount(Ok(count)) => {
                trace!(target: "RemoteTableModel", "Row count loaded: {}", count);
                self.count_pending = false;
                self.blocks.clear();
                self.block_order.clear();
                self.row_count = count;
                self.loaded_pattern = self.pattern.clone();
                self.events.push(ModelEvent::DataChanged);
            }
            CompletionKind::RowCount(Err(e)) => {
                warn!(target: "RemoteTableModel", "Row count request failed: {:#}", e);
                self.count_pending = false;
                if self.pattern != self.loaded_pattern {
                    debug!(
                        target: "RemoteTableModel",
                        "Falling back to {:?}",
                        self.loaded_pattern.text
                    );
                    self.pattern = self.loaded_pattern.clone();
                }
                self.events.push(ModelEvent::LoadFailed(ProviderError::RowCount {
                    generation: completion.generation,
                    message: format!("{:#}", e),
                }));
            }
            CompletionKind::Rows {
                first,
                last,
                result,
            } => {
                let block = first / self.block_size;
                self.pending_blocks.remove(&block);
                match result {
                    Ok(rows) => {
                        trace!(target: "RemoteTableModel", "Rows {}..={} loaded", first, last);
                        self.cache_block(block, rows);
                        self.events.push(ModelEvent::DataChanged);
                    }
                    Err(e) => {
                        warn!(
                            target: "RemoteTableModel",
                            "Rows {}..={} request failed: {:#}",
                            first,
                            last,
                            e
                        );
                        self.events.push(ModelEvent::LoadFailed(ProviderError::Rows {
                            generation: completion.generation,
                            first,
                            last,
                            message: format!("{:#}", e),
                        }));
                    }
                }
            }
        }

        if self.outstanding == 0 {
            self.set_loading(false);
        }
        true
    }

    /// Apply every completion that has already arrived
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply_completion(completion) {
                applied += 1;
            }
        }
        applied
    }

    fn spawn_request<F>(&mut self, request: F)
    where
        F: std::future::Future<Output = CompletionKind> + Send + 'static,
    {
        let generation = self.generation;
        let tx = self.completions_tx.clone();
        self.outstanding += 1;
        self.set_loading(true);

        tokio::spawn(async move {
            let kind = request.await;
            // The receiver lives as long as the model; a send error only means
            // the model is gone and nobody cares about the answer.
            let _ = tx.send(Completion { generation, kind });
        });
    }

    fn request_block(&mut self, block: usize) {
        let first = block * self.block_size;
        if first >= self.row_count {
            return;
        }
        let last = (first + self.block_size).min(self.row_count) - 1;
        self.pending_blocks.insert(block);

        let source = Arc::clone(&self.source);
        let pattern = self.loaded_pattern.clone();
        self.spawn_request(async move {
            let result = source.load_window(&pattern, first, last).await;
            CompletionKind::Rows {
                first,
                last,
                result,
            }
        });
    }

    fn cache_block(&mut self, block: usize, rows: Vec<Row>) {
        if self.blocks.insert(block, rows).is_none() {
            self.block_order.push_back(block);
        }
        while self.block_order.len() > self.max_cached_blocks {
            if let Some(evicted) = self.block_order.pop_front() {
                trace!(target: "RemoteTableModel", "Evicting block {}", evicted);
                self.blocks.remove(&evicted);
            }
        }
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.events.push(ModelEvent::LoadingChanged(loading));
        }
    }

    /// Reject patterns that do not compile, then reload if anything changed
    fn replace_pattern(&mut self, pattern: SearchPattern) -> Result<bool, PatternError> {
        if let Err(e) = Matcher::compile(&pattern) {
            warn!(target: "RemoteTableModel", "Rejected search pattern: {}", e);
            return Err(e);
        }
        if pattern == self.pattern {
            return Ok(false);
        }
        self.pattern = pattern;
        self.reload_data();
        Ok(true)
    }
}

impl DataProvider for RemoteTableModel {
    fn get_row(&self, index: usize) -> Option<Row> {
        if index >= self.row_count {
            return None;
        }
        let block = self.blocks.get(&(index / self.block_size))?;
        block.get(index % self.block_size).cloned()
    }

    fn get_row_count(&self) -> usize {
        self.row_count
    }
}

#[async_trait]
impl SearchModel for RemoteTableModel {
    fn set_search_pattern(&mut self, pattern: Option<String>) -> Result<bool, PatternError> {
        let next = SearchPattern {
            text: pattern,
            ..self.pattern.clone()
        };
        self.replace_pattern(next)
    }

    fn search_pattern(&self) -> Option<&str> {
        self.pattern.text.as_deref()
    }

    fn set_anchor_front(&mut self, anchored: bool) -> Result<(), PatternError> {
        let next = self.pattern.clone().anchored(anchored);
        self.replace_pattern(next).map(|_| ())
    }

    fn set_search_as_regex(&mut self, use_regex: bool) -> Result<(), PatternError> {
        let next = SearchPattern {
            use_regex,
            ..self.pattern.clone()
        };
        self.replace_pattern(next).map(|_| ())
    }

    fn set_match_mode(&mut self, anchored: bool, use_regex: bool) -> Result<(), PatternError> {
        let next = SearchPattern {
            anchored,
            use_regex,
            ..self.pattern.clone()
        };
        self.replace_pattern(next).map(|_| ())
    }

    fn is_loading(&self) -> bool {
        self.loading
    }

    fn request_rows(&mut self, first: usize, last: usize) {
        if self.count_pending {
            trace!(target: "RemoteTableModel", "Count pending, not loading {}..={}", first, last);
            return;
        }
        if self.row_count == 0 || last < first {
            return;
        }
        let last = last.min(self.row_count - 1);
        for block in first / self.block_size..=last / self.block_size {
            if !self.blocks.contains_key(&block) && !self.pending_blocks.contains(&block) {
                self.request_block(block);
            }
        }
    }

    fn take_events(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }

    async fn process_completion(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => self.apply_completion(completion),
            None => std::future::pending::<bool>().await,
        }
    }
}
