//! Flattening chunk content into a single string.

use docstruct_core::{Chunk, StructuredElement};
use once_cell::sync::Lazy;
use regex::Regex;

static STRUCTURE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[/?\w+\]").expect("structure tag regex is valid"));

/// Join the rendered text of each element with blank lines, dropping
/// elements that render to whitespace only.
pub fn merge_text<'a>(elements: impl IntoIterator<Item = &'a StructuredElement>) -> String {
    elements
        .into_iter()
        .map(|e| e.render_text())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Merged text of a chunk.
pub fn chunk_text(chunk: &Chunk) -> String {
    merge_text(chunk.elements())
}

/// Remove inline structure tags such as `[heading]` or `[/paragraph]`.
pub fn strip_structure_tags(text: &str) -> String {
    STRUCTURE_TAG.replace_all(text, "").trim().to_string()
}
