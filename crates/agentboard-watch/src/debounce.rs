//! Debounce/max-wait batching contract (§4.2). Kept as pure, `Instant`-driven
//! state so it can be unit tested without a real timer or filesystem.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Default debounce window: flush once no new event has arrived for this long.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;
/// Default hard cap: flush no later than this long after the first pending event.
pub const DEFAULT_MAX_WAIT_MS: u64 = 5000;

/// Accumulates a deduped, insertion-ordered batch of paths and decides when it's
/// time to flush.
pub struct DebounceBatcher {
    debounce: Duration,
    max_wait: Duration,
    order: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
    first_event_at: Option<Instant>,
    last_event_at: Option<Instant>,
}

impl DebounceBatcher {
    pub fn new(debounce: Duration, max_wait: Duration) -> Self {
        Self {
            debounce,
            max_wait,
            order: Vec::new(),
            seen: HashSet::new(),
            first_event_at: None,
            last_event_at: None,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            Duration::from_millis(DEFAULT_MAX_WAIT_MS),
        )
    }

    /// Record an accepted path at `now`, adding it to the pending set if not
    /// already present and (re)starting the debounce clock.
    pub fn record(&mut self, path: PathBuf, now: Instant) {
        if self.seen.insert(path.clone()) {
            self.order.push(path);
        }
        self.first_event_at.get_or_insert(now);
        self.last_event_at = Some(now);
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the pending batch should be flushed at `now`: either the debounce
    /// timer has quieted, or the max-wait ceiling since the first event has
    /// elapsed (§4.2: "whichever first").
    pub fn ready_to_flush(&self, now: Instant) -> bool {
        match (self.first_event_at, self.last_event_at) {
            (Some(first), Some(last)) => {
                now.duration_since(last) >= self.debounce || now.duration_since(first) >= self.max_wait
            }
            _ => false,
        }
    }

    /// How long until `ready_to_flush` would next return true, for scheduling a
    /// wakeup. `None` if nothing is pending.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let (first, last) = (self.first_event_at?, self.last_event_at?);
        let debounce_deadline = last + self.debounce;
        let max_wait_deadline = first + self.max_wait;
        let deadline = debounce_deadline.min(max_wait_deadline);
        Some(deadline.saturating_duration_since(now))
    }

    /// Flush and clear the pending set, returning the deduped batch in insertion
    /// order. Used both by the timer-driven flush and by `stop()`'s synchronous
    /// flush.
    pub fn flush(&mut self) -> Vec<PathBuf> {
        self.first_event_at = None;
        self.last_event_at = None;
        self.seen.clear();
        std::mem::take(&mut self.order)
    }
}
