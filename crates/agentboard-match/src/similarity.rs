//! Token-overlap similarity (§4.4): Jaccard, containment, and their hybrid average,
//! gated by a minimum token count on either side.

use std::collections::HashSet;

/// The three similarity measures the window-selection contract can be configured
/// to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityKind {
    Jaccard,
    Containment,
    Hybrid,
}

/// A computed similarity score plus the token counts it was derived from, so
/// callers can apply the `minTokens` gate without recomputing set sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityResult {
    pub score: f64,
    pub left_tokens: usize,
    pub right_tokens: usize,
}

fn to_set(tokens: &[String]) -> HashSet<&str> {
    tokens.iter().map(String::as_str).collect()
}

/// `overlap / (|L| + |R| - overlap)`.
pub fn jaccard(left: &[String], right: &[String]) -> f64 {
    let l = to_set(left);
    let r = to_set(right);
    let overlap = l.intersection(&r).count();
    let union = l.len() + r.len() - overlap;
    if union == 0 { 0.0 } else { overlap as f64 / union as f64 }
}

/// `overlap / min(|L|, |R|)`.
pub fn containment(left: &[String], right: &[String]) -> f64 {
    let l = to_set(left);
    let r = to_set(right);
    let overlap = l.intersection(&r).count();
    let denom = l.len().min(r.len());
    if denom == 0 { 0.0 } else { overlap as f64 / denom as f64 }
}

/// `(jaccard + containment) / 2`.
pub fn hybrid(left: &[String], right: &[String]) -> f64 {
    (jaccard(left, right) + containment(left, right)) / 2.0
}

/// Compute similarity under `kind`, gated by `min_tokens`: if either side has
/// fewer than `min_tokens` tokens, the score is forced to 0 regardless of overlap.
pub fn compute(kind: SimilarityKind, left: &[String], right: &[String], min_tokens: usize) -> SimilarityResult {
    let left_tokens = left.len();
    let right_tokens = right.len();

    if left_tokens < min_tokens || right_tokens < min_tokens {
        return SimilarityResult {
            score: 0.0,
            left_tokens,
            right_tokens,
        };
    }

    let score = match kind {
        SimilarityKind::Jaccard => jaccard(left, right),
        SimilarityKind::Containment => containment(left, right),
        SimilarityKind::Hybrid => hybrid(left, right),
    };

    SimilarityResult {
        score,
        left_tokens,
        right_tokens,
    }
}
