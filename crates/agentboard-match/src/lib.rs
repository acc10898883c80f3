//! Matches a transcript to the tmux window it belongs to by comparing
//! normalised, tokenised text.

pub mod exact_match;
pub mod extract_text;
pub mod last_exchange;
pub mod normalize;
pub mod similarity;
pub mod tokenize;
pub mod window_select;

pub use exact_match::{NaiveSubstringSearch, SubstringSearch, SubstringSearchError, find_unique_match};
pub use extract_text::{DEFAULT_BYTE_LIMIT, DEFAULT_LINE_LIMIT, ExtractMode, extract_log_text, read_tail_values};
pub use last_exchange::{LastExchange, last_exchange_from_log, last_exchange_from_pane};
pub use normalize::normalize;
pub use similarity::{SimilarityKind, SimilarityResult, compute, containment, hybrid, jaccard};
pub use tokenize::{count_tokens, tokenize};
pub use window_select::{
    DEFAULT_MIN_GAP, DEFAULT_MIN_SCORE, DEFAULT_MIN_TOKENS, LAST_EXCHANGE_MIN_TOKENS, SHORT_SESSION_MIN_SCORE,
    SHORT_SESSION_TOKENS, WindowSelectConfig, effective_min_score, select_window,
};
