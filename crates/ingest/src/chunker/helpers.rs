//! Splitting utilities for items that exceed the token budget.

use super::token_counter::{count_or_fallback, TokenCounter};

/// Separator used to split and rejoin oversized paragraphs.
pub(crate) const SENTENCE_SEPARATOR: &str = ". ";

/// Greedily pack the `". "`-separated fragments of `text` into pieces of at
/// most `max_tokens`, counted per fragment. A single fragment larger than the
/// budget becomes a piece on its own.
pub(crate) fn pack_sentences(
    text: &str,
    max_tokens: usize,
    counter: &dyn TokenCounter,
) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0;

    for fragment in text.split(SENTENCE_SEPARATOR) {
        let tokens = count_or_fallback(counter, fragment);
        if current_tokens + tokens > max_tokens && !current.is_empty() {
            pieces.push(current.join(SENTENCE_SEPARATOR));
            current.clear();
            current_tokens = 0;
        }
        current.push(fragment);
        current_tokens += tokens;
    }
    if !current.is_empty() {
        pieces.push(current.join(SENTENCE_SEPARATOR));
    }
    pieces
}
