//! Local stand-in for a paged backend.
//!
//! Rows are synthesized on demand from a fixed vocabulary. When a pattern is
//! active its text is woven into every generated row so that each one visibly
//! matches.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

use crate::data::row::Row;
use crate::remote::estimator::{CountEstimator, DecayEstimator};
use crate::remote::row_source::RowSource;
use crate::search::pattern::SearchPattern;

pub const DEFAULT_BASE_POPULATION: usize = 5_000_000;

const LYRICS: &str = "All the leaves are brown And the sky is grey \
    I went for a walk On a winter's day I'd be safe \
    and warm If I was in California dreamin \
    On such a winter's day I stopped into a church \
    stopped into a church I passed along the way \
    passed along the way You know, I got down on my knees \
    got down on my knees And I pretend to pray \
    I pretend to pray Oh, the preacher likes the cold \
    preacher likes the cold He knows I'm gonna stay \
    knows I'm gonna stay Oh, California dreamin' California dreamin' \
    On such a winter's day All the leaves are brown the leaves are brown \
    And the sky is grey and the sky is grey";

pub struct SimulatedBackend {
    base_population: usize,
    estimator: Box<dyn CountEstimator>,
    vocabulary: Vec<&'static str>,
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic row synthesis
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            base_population: DEFAULT_BASE_POPULATION,
            estimator: Box::new(DecayEstimator::default()),
            vocabulary: LYRICS.split(' ').collect(),
            rng: Mutex::new(rng),
            latency: Duration::ZERO,
        }
    }

    pub fn with_base_population(mut self, base_population: usize) -> Self {
        self.base_population = base_population;
        self
    }

    pub fn with_estimator(mut self, estimator: impl CountEstimator + 'static) -> Self {
        self.estimator = Box::new(estimator);
        self
    }

    /// Delay every answer, the way a slow network would
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn base_population(&self) -> usize {
        self.base_population
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn synthesize(&self, pattern: &SearchPattern, first: usize, last: usize) -> Vec<Row> {
        let infix = pattern
            .active_text()
            .map(|text| format!("{} ", text))
            .unwrap_or_default();
        let vocabulary = &self.vocabulary;
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut word = || vocabulary[rng.gen_range(0..vocabulary.len())];

        (first..=last)
            .map(|id| {
                let text = format!("{} {}{} {}", word(), infix, word(), word());
                Row::pair(id.to_string(), text)
            })
            .collect()
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowSource for SimulatedBackend {
    async fn estimate_count(&self, pattern: &SearchPattern) -> anyhow::Result<usize> {
        self.simulate_latency().await;
        let count = self.estimator.estimate(self.base_population, pattern);
        trace!(target: "SimulatedBackend", "Estimated {} rows for {:?}", count, pattern.text);
        Ok(count)
    }

    async fn load_window(
        &self,
        pattern: &SearchPattern,
        first: usize,
        last: usize,
    ) -> anyhow::Result<Vec<Row>> {
        if last < first {
            anyhow::bail!("invalid window {}..={}", first, last);
        }
        self.simulate_latency().await;
        Ok(self.synthesize(pattern, first, last))
    }
}
