//! Structural extraction of office documents.
//!
//! Every extractor turns one file into an ordered `Vec<StructuredElement>`.
//! Extraction is all-or-nothing: a document that fails mid-parse yields an
//! error and no elements.

pub mod docx;
pub mod pdf;

use std::path::Path;

use docstruct_core::config::{DocxConfig, PdfConfig};
use docstruct_core::StructuredElement;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error in {part}: {source}")]
    Xml {
        part: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for ExtractionError {
    fn from(e: lopdf::Error) -> Self {
        ExtractionError::Pdf(e.to_string())
    }
}

/// Supported input formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Docx,
    Pdf,
}

impl FileType {
    /// Resolve a format from a file name or path (case-insensitive extension).
    pub fn from_name(name: &str) -> Result<Self, ExtractionError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "docx" => Ok(FileType::Docx),
            "pdf" => Ok(FileType::Pdf),
            "" => Err(ExtractionError::UnsupportedFormat(String::new())),
            _ => Err(ExtractionError::UnsupportedFormat(format!(".{ext}"))),
        }
    }
}

/// Extractor settings for both formats.
#[derive(Debug, Clone, Default)]
pub struct ExtractorOptions {
    pub docx: DocxConfig,
    pub pdf: PdfConfig,
}

/// Extract the structure of a file on disk with default settings.
pub fn extract_structure(path: &Path) -> Result<Vec<StructuredElement>, ExtractionError> {
    extract_structure_with(path, &ExtractorOptions::default())
}

/// Extract the structure of a file on disk.
pub fn extract_structure_with(
    path: &Path,
    options: &ExtractorOptions,
) -> Result<Vec<StructuredElement>, ExtractionError> {
    // Check the extension before touching the file system.
    FileType::from_name(&path.to_string_lossy())?;
    let bytes = std::fs::read(path)?;
    extract_structure_from_bytes(&bytes, &path.to_string_lossy(), options)
}

/// Extract the structure of in-memory file bytes, dispatching on `filename`.
pub fn extract_structure_from_bytes(
    bytes: &[u8],
    filename: &str,
    options: &ExtractorOptions,
) -> Result<Vec<StructuredElement>, ExtractionError> {
    let elements = match FileType::from_name(filename)? {
        FileType::Docx => docx::extract_docx(bytes, &options.docx)?,
        FileType::Pdf => pdf::extract_pdf(bytes, &options.pdf)?,
    };
    info!(file = %filename, elements = elements.len(), "extracted document structure");
    Ok(elements)
}
