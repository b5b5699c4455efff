use std::time::Duration;
use tokio::time::Instant;
use tracing::{trace, warn};

/// Deadline used when `now + delay` is not representable
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Where the debouncer currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    PendingCommit { value: String, deadline: Instant },
}

/// Turns a burst of input values into a single commit once input goes quiet.
///
/// Only one deadline exists at a time: every new value replaces the pending
/// one and restarts the delay. Time is passed in explicitly by the `*_at`
/// methods; the plain variants read the tokio clock, which tests can pause.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// The duration to wait after the last event before committing
    delay: Duration,
    state: DebounceState,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self::with_delay(Duration::from_millis(delay_ms))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Register a new input value
    pub fn trigger(&mut self, value: String) {
        self.trigger_at(value, Instant::now());
    }

    /// Register a new input value observed at `now`, superseding any pending one
    pub fn trigger_at(&mut self, value: String, now: Instant) {
        if let DebounceState::PendingCommit { value: old, .. } = &self.state {
            trace!(target: "Debouncer", "Superseding pending value {:?}", old);
        }
        let deadline = now.checked_add(self.delay).unwrap_or_else(|| {
            warn!(target: "Debouncer", "Delay {:?} overflows the clock", self.delay);
            now.checked_add(FAR_FUTURE).unwrap_or(now)
        });
        self.state = DebounceState::PendingCommit { value, deadline };
    }

    /// Take the pending value if its deadline has passed
    pub fn poll(&mut self) -> Option<String> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<String> {
        let due = matches!(
            &self.state,
            DebounceState::PendingCommit { deadline, .. } if *deadline <= now
        );
        if !due {
            return None;
        }
        self.cancel()
    }

    /// Wait for the pending deadline and take its value.
    ///
    /// Never resolves while idle. Dropping the future loses nothing; the
    /// value stays pending until taken.
    pub async fn wait(&mut self) -> String {
        loop {
            match self.deadline() {
                Some(deadline) => {
                    tokio::time::sleep_until(deadline).await;
                    if let Some(value) = self.poll_at(deadline) {
                        return value;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::PendingCommit { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    /// Get the time remaining before the commit fires.
    /// Returns None if nothing is pending.
    pub fn time_remaining_at(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Cancel any pending commit, returning the value it would have carried
    pub fn cancel(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::PendingCommit { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }

    /// Check if there's a pending commit
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::PendingCommit { .. })
    }
}
