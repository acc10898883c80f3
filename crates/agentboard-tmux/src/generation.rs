//! Pane generation tracker: detects pane reuse by tracking pane_id lifetimes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// Tracks pane generations to detect pane reuse.
///
/// When a pane_id disappears and reappears, the generation counter
/// increments to signal that it's a new logical pane.
#[derive(Debug, Clone, Default)]
pub struct PaneGenerationTracker {
    map: HashMap<String, (u64, DateTime<Utc>)>,
}

impl PaneGenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update tracker with current set of pane IDs.
    ///
    /// New pane IDs get generation 0 and `now` as birth_ts.
    /// Existing pane IDs keep their current generation.
    pub fn update(&mut self, current_pane_ids: &[&str], now: DateTime<Utc>) {
        for &pane_id in current_pane_ids {
            self.map.entry(pane_id.to_string()).or_insert((0, now));
        }
    }

    /// Get generation and birth_ts for a pane.
    pub fn get(&self, pane_id: &str) -> Option<(u64, DateTime<Utc>)> {
        self.map.get(pane_id).copied()
    }

    /// Bump generation for a pane (e.g., when we detect it has been reused).
    pub fn bump(&mut self, pane_id: &str, now: DateTime<Utc>) {
        let entry = self.map.entry(pane_id.to_string()).or_insert((0, now));
        entry.0 += 1;
        entry.1 = now;
    }
}
