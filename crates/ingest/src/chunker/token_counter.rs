//! Pluggable token counting.

use docstruct_core::TokenCountError;
use tracing::warn;

/// Counts tokens of a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize, TokenCountError>;
}

/// Approximate token count via whitespace splitting.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn count(&self, text: &str) -> Result<usize, TokenCountError> {
        Ok(whitespace_count(text))
    }
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> Result<usize, TokenCountError> + Send + Sync,
{
    fn count(&self, text: &str) -> Result<usize, TokenCountError> {
        self(text)
    }
}

pub(crate) fn whitespace_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count with `counter`, falling back to the whitespace count when it fails.
/// Empty text is always zero tokens.
pub(crate) fn count_or_fallback(counter: &dyn TokenCounter, text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    match counter.count(text) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "token counter failed, using whitespace count");
            whitespace_count(text)
        }
    }
}

/// BPE token counts with the `o200k_base` encoding.
#[cfg(feature = "tiktoken")]
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

#[cfg(feature = "tiktoken")]
impl TiktokenCounter {
    pub fn o200k() -> Result<Self, TokenCountError> {
        let bpe = tiktoken_rs::o200k_base().map_err(|e| TokenCountError(e.to_string()))?;
        Ok(Self { bpe })
    }
}

#[cfg(feature = "tiktoken")]
impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> Result<usize, TokenCountError> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }
}
