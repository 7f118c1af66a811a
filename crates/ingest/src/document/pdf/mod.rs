//! PDF extraction.
//!
//! Pages are interpreted into positioned lines ([`layout`]), then structured
//! in two passes: recurring header/footer detection across all pages, then
//! per-page heading, table and paragraph reconstruction.

mod boundary;
mod content;
mod fonts;
pub mod layout;
mod structure;
mod tables;

use std::panic::{catch_unwind, AssertUnwindSafe};

use docstruct_core::config::PdfConfig;
use docstruct_core::StructuredElement;
use lopdf::Document;
use tracing::{debug, warn};

use super::ExtractionError;

pub use boundary::RecurringBoundaries;
pub use content::read_pages;
pub use layout::{group_lines, PageLayout, TextLine, TextSpan};
pub use structure::{is_bold_line, PageStructurer};
pub use tables::{detect_tables, DetectedTable};

/// Structure already-interpreted pages.
pub fn structure_pages(pages: &[PageLayout], config: &PdfConfig) -> Vec<StructuredElement> {
    let boundaries = RecurringBoundaries::detect(pages, config);
    let mut structurer = PageStructurer::new(config, &boundaries);
    for page in pages {
        structurer.structure_page(page);
    }
    structurer.finish()
}

/// Extract structural elements from PDF bytes.
pub fn extract_pdf(
    bytes: &[u8],
    config: &PdfConfig,
) -> Result<Vec<StructuredElement>, ExtractionError> {
    // lopdf can panic on malformed objects and CMaps.
    let pages = catch_unwind(AssertUnwindSafe(|| {
        let document = Document::load_mem(bytes)?;
        read_pages(&document)
    }))
    .map_err(|_| {
        warn!("pdf parser panicked on malformed input");
        ExtractionError::Pdf("parser panicked on malformed input".into())
    })??;
    debug!(pages = pages.len(), "interpreted pdf pages");
    Ok(structure_pages(&pages, config))
}
