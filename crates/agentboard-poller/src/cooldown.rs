//! Per-session rematch rate limiting (§5: "rate-limited by `REMATCH_COOLDOWN_MS`
//! using an in-memory map").

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Minimum spacing between rematch attempts for the same session.
pub const REMATCH_COOLDOWN_MS: u64 = 60_000;

#[derive(Debug, Default)]
pub struct RematchCooldown {
    last_attempt: HashMap<String, Instant>,
}

impl RematchCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `session_id` attempted a rematch within the cooldown window.
    pub fn is_cooling_down(&self, session_id: &str, now: Instant) -> bool {
        match self.last_attempt.get(session_id) {
            Some(at) => now.duration_since(*at) < Duration::from_millis(REMATCH_COOLDOWN_MS),
            None => false,
        }
    }

    pub fn record_attempt(&mut self, session_id: &str, now: Instant) {
        self.last_attempt.insert(session_id.to_string(), now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_not_cooling_down() {
        let cooldown = RematchCooldown::new();
        assert!(!cooldown.is_cooling_down("a", Instant::now()));
    }

    #[test]
    fn recorded_attempt_blocks_until_window_elapses() {
        let mut cooldown = RematchCooldown::new();
        let t0 = Instant::now();
        cooldown.record_attempt("a", t0);

        assert!(cooldown.is_cooling_down("a", t0));
        let later = t0 + Duration::from_millis(REMATCH_COOLDOWN_MS);
        assert!(!cooldown.is_cooling_down("a", later));
    }

    #[test]
    fn other_sessions_are_unaffected() {
        let mut cooldown = RematchCooldown::new();
        let t0 = Instant::now();
        cooldown.record_attempt("a", t0);
        assert!(!cooldown.is_cooling_down("b", t0));
    }
}
