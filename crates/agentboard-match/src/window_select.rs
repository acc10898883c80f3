//! Window-selection contract (§4.4): score every candidate window against a
//! log's token set, then accept the best one only if it clears the token,
//! score, and gap gates — otherwise return why it was rejected.

use agentboard_core::{MatchRejectReason, WindowKey};

use crate::similarity::{SimilarityKind, compute};

/// Log-side tokens below this count relax `minScore` to `SHORT_SESSION_MIN_SCORE`.
pub const SHORT_SESSION_TOKENS: usize = 300;
/// Relaxed score floor applied to short sessions (§4.4 point 4).
pub const SHORT_SESSION_MIN_SCORE: f64 = 0.3;

/// Default `minTokens` for the full-transcript scope (§4.4 point 5).
pub const DEFAULT_MIN_TOKENS: usize = 10;
/// Default `minTokens` for the `last-exchange` scope (§4.4 point 5).
pub const LAST_EXCHANGE_MIN_TOKENS: usize = 5;
pub const DEFAULT_MIN_SCORE: f64 = 0.7;
pub const DEFAULT_MIN_GAP: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSelectConfig {
    pub min_tokens: usize,
    pub min_score: f64,
    pub min_gap: f64,
    pub similarity_kind: SimilarityKind,
}

impl Default for WindowSelectConfig {
    fn default() -> Self {
        Self {
            min_tokens: DEFAULT_MIN_TOKENS,
            min_score: DEFAULT_MIN_SCORE,
            min_gap: DEFAULT_MIN_GAP,
            similarity_kind: SimilarityKind::Hybrid,
        }
    }
}

/// The score one candidate window earned against a log's token set.
#[derive(Debug, Clone, PartialEq)]
struct WindowScore {
    key: WindowKey,
    score: f64,
    log_tokens: usize,
    window_tokens: usize,
}

/// Relax `min_score` to `SHORT_SESSION_MIN_SCORE` when the log side is short
/// (§4.4 point 4).
pub fn effective_min_score(min_score: f64, log_tokens: usize) -> f64 {
    if log_tokens < SHORT_SESSION_TOKENS {
        SHORT_SESSION_MIN_SCORE
    } else {
        min_score
    }
}

/// Apply the window-selection contract: score `candidates` against `log_tokens`,
/// sort descending, and accept the top one iff it clears every gate.
pub fn select_window(
    log_tokens: &[String],
    candidates: &[(WindowKey, Vec<String>)],
    config: &WindowSelectConfig,
) -> Result<WindowKey, MatchRejectReason> {
    if candidates.is_empty() {
        return Err(MatchRejectReason::NoWindows);
    }

    let mut scored: Vec<WindowScore> = candidates
        .iter()
        .map(|(key, window_tokens)| {
            let result = compute(config.similarity_kind, log_tokens, window_tokens, config.min_tokens);
            WindowScore {
                key: key.clone(),
                score: result.score,
                log_tokens: result.left_tokens,
                window_tokens: result.right_tokens,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).expect("scores are finite"));

    let best = &scored[0];
    let second_score = scored.get(1).map(|s| s.score).unwrap_or(0.0);

    if best.log_tokens < config.min_tokens || best.window_tokens < config.min_tokens {
        return Err(MatchRejectReason::TooFewTokens);
    }

    let threshold = effective_min_score(config.min_score, best.log_tokens);
    if best.score < threshold {
        return Err(MatchRejectReason::LowScore);
    }

    if best.score - second_score < config.min_gap {
        return Err(MatchRejectReason::LowGap);
    }

    Ok(best.key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn key(s: &str) -> WindowKey {
        WindowKey::new("sess", s)
    }

    #[test]
    fn no_candidates_rejects_with_no_windows() {
        let result = select_window(&toks("a b c"), &[], &WindowSelectConfig::default());
        assert_eq!(result, Err(MatchRejectReason::NoWindows));
    }

    #[test]
    fn accepts_clear_winner() {
        let log = toks("alpha beta gamma delta epsilon zeta eta theta iota kappa");
        let candidates = vec![
            (key("1"), log.clone()),
            (key("2"), toks("totally unrelated words that share nothing at all with above")),
        ];
        let result = select_window(&log, &candidates, &WindowSelectConfig::default());
        assert_eq!(result, Ok(key("1")));
    }

    #[test]
    fn rejects_too_few_tokens() {
        let log = toks("only two");
        let candidates = vec![(key("1"), toks("only two"))];
        let result = select_window(&log, &candidates, &WindowSelectConfig::default());
        assert_eq!(result, Err(MatchRejectReason::TooFewTokens));
    }

    #[test]
    fn rejects_low_gap_between_close_candidates() {
        let log = toks("alpha beta gamma delta epsilon zeta eta theta iota kappa");
        let near = toks("alpha beta gamma delta epsilon zeta eta theta iota lambda");
        let candidates = vec![(key("1"), log.clone()), (key("2"), near)];
        let result = select_window(&log, &candidates, &WindowSelectConfig::default());
        assert_eq!(result, Err(MatchRejectReason::LowGap));
    }

    #[test]
    fn short_session_relaxes_min_score() {
        assert_eq!(effective_min_score(DEFAULT_MIN_SCORE, 50), SHORT_SESSION_MIN_SCORE);
        assert_eq!(effective_min_score(DEFAULT_MIN_SCORE, 1000), DEFAULT_MIN_SCORE);
    }
}
