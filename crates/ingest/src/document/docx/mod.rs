//! Word-processor (`.docx`) extraction.
//!
//! The package is first read into a small owned model ([`WordDocument`]),
//! which is then walked in document order by [`walker::BodyWalker`].

mod package;
mod walker;

use docstruct_core::config::DocxConfig;
use docstruct_core::{Formatting, StructuredElement};

use super::ExtractionError;

pub use package::read_package;
pub use walker::{detect_heading_level, is_list_style, BodyWalker};

/// Content of a `.docx` relevant to structural extraction.
#[derive(Debug, Clone, Default)]
pub struct WordDocument {
    pub sections: Vec<SectionParts>,
    pub body: Vec<Block>,
}

/// Header and footer paragraphs of one section, already resolved through
/// inheritance from earlier sections.
#[derive(Debug, Clone, Default)]
pub struct SectionParts {
    /// True when the section has no default header of its own.
    pub header_linked: bool,
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

/// A top-level body block.
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(WordParagraph),
    Table(WordTable),
}

#[derive(Debug, Clone, Default)]
pub struct WordParagraph {
    pub text: String,
    /// Display name of the paragraph style (e.g. "Heading 1").
    pub style: String,
    /// Formatting of each run, in order.
    pub runs: Vec<Formatting>,
    /// Direct left indent in points.
    pub left_indent: Option<f64>,
}

impl WordParagraph {
    pub fn new(text: &str, style: &str) -> Self {
        Self {
            text: text.to_string(),
            style: style.to_string(),
            ..Self::default()
        }
    }
}

/// Table as a grid of cell texts; merged cells repeat their text.
#[derive(Debug, Clone, Default)]
pub struct WordTable {
    pub rows: Vec<Vec<String>>,
}

/// Extract structural elements from `.docx` bytes.
pub fn extract_docx(
    bytes: &[u8],
    config: &DocxConfig,
) -> Result<Vec<StructuredElement>, ExtractionError> {
    let document = read_package(bytes)?;
    Ok(BodyWalker::new(config).walk(&document))
}
