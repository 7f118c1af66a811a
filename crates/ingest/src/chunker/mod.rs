//! Hierarchical chunking engine.
//!
//! Regroups an extracted element sequence into token-budgeted chunks,
//! keeping tables whole and splitting only oversized paragraphs.

mod helpers;
mod hierarchical;
mod token_counter;

pub use hierarchical::HierarchicalChunker;
#[cfg(feature = "tiktoken")]
pub use token_counter::TiktokenCounter;
pub use token_counter::{TokenCounter, WhitespaceCounter};
