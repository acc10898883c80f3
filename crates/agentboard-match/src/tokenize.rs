//! Tokenisation (§4.4): normalise then split on whitespace. This is the "exact
//! tokenizer" that §4.3's token-count enrichment cross-references.

use crate::normalize::normalize;

/// Normalise `text` and split it into whitespace-separated tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token count only — the cheap path used by enrichment (§4.3) that doesn't need
/// the token vector itself.
pub fn count_tokens(text: &str) -> usize {
    tokenize(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_sentence() {
        let tokens = tokenize("Hello, World! This is a Test.");
        assert_eq!(tokens, vec!["hello,", "world!", "this", "is", "a", "test."]);
    }

    #[test]
    fn strips_ansi_before_tokenizing() {
        let tokens = tokenize("\x1b[31mred\x1b[0m token");
        assert_eq!(tokens, vec!["red", "token"]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t  ").is_empty());
    }

    #[test]
    fn count_tokens_matches_tokenize_len() {
        assert_eq!(count_tokens("one two three"), 3);
    }
}
