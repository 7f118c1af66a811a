//! Document ingestion: structural extraction of `.docx` and PDF files,
//! hierarchical chunking and batched indexing.

pub mod chunker;
pub mod document;
pub mod index;
pub mod merge;

pub use chunker::{HierarchicalChunker, TokenCounter, WhitespaceCounter};
pub use document::{
    extract_structure, extract_structure_from_bytes, extract_structure_with, ExtractionError,
    ExtractorOptions, FileType,
};
pub use merge::{merge_text, strip_structure_tags};
