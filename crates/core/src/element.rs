use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of an extracted element.
pub type ElementId = Uuid;

/// Classification of an extracted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Header,
    Footer,
    Heading,
    List,
    Paragraph,
    Table,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Header => write!(f, "Header"),
            ElementKind::Footer => write!(f, "Footer"),
            ElementKind::Heading => write!(f, "Heading"),
            ElementKind::List => write!(f, "List"),
            ElementKind::Paragraph => write!(f, "Paragraph"),
            ElementKind::Table => write!(f, "Table"),
        }
    }
}

/// Character formatting aggregated over an element's runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Formatting {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }
}

/// Where an element sits in its source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Monotonic counter of logical sections (blocks for DOCX, headings for PDF).
    pub section_index: usize,
    /// Exact for PDFs, estimated for DOCX. Header/footer elements from DOCX
    /// carry the sentinels [`HEADER_PAGE`] and [`FOOTER_PAGE`].
    pub page_number: Option<i32>,
}

/// Page sentinel assigned to DOCX header elements.
pub const HEADER_PAGE: i32 = 1;
/// Page sentinel assigned to DOCX footer elements.
pub const FOOTER_PAGE: i32 = -1;

impl Position {
    pub fn new(section_index: usize, page_number: i32) -> Self {
        Self {
            section_index,
            page_number: Some(page_number),
        }
    }
}

/// One cell of an extracted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,
    pub row: usize,
    pub col: usize,
}

/// One classified unit of extracted document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredElement {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Plain text. Always empty for tables.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub style: Option<String>,
    /// 0 means "not a heading".
    #[serde(default)]
    pub heading_level: u32,
    #[serde(default)]
    pub formatting: Formatting,
    /// Left indent in points.
    #[serde(default)]
    pub list_level: Option<f64>,
    pub position: Position,
    /// Table rows, empty for every other kind.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Vec<TableCell>>,
    /// Reserved for nesting; extractors emit flat sequences.
    #[serde(default)]
    pub children: Vec<StructuredElement>,
}

impl StructuredElement {
    /// Text element with neutral metadata and a fresh id.
    pub fn new(kind: ElementKind, text: impl Into<String>, position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            style: None,
            heading_level: 0,
            formatting: Formatting::default(),
            list_level: None,
            position,
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Table element; `text` stays empty and the rows live in `content`.
    pub fn table(rows: Vec<Vec<TableCell>>, position: Position) -> Self {
        Self {
            content: rows,
            ..Self::new(ElementKind::Table, String::new(), position)
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_heading_level(mut self, level: u32) -> Self {
        self.heading_level = level;
        self
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    pub fn with_list_level(mut self, level: f64) -> Self {
        self.list_level = Some(level);
        self
    }

    pub fn is_table(&self) -> bool {
        self.kind == ElementKind::Table
    }

    /// Text used for token counting and merging: tables render each row as
    /// `cell | cell` and join rows with newlines.
    pub fn render_text(&self) -> Cow<'_, str> {
        if self.is_table() {
            Cow::Owned(render_rows(&self.content))
        } else {
            Cow::Borrowed(self.text.as_str())
        }
    }
}

fn render_rows(rows: &[Vec<TableCell>]) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.text.as_str())
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build table rows from a plain text matrix, numbering cells by position.
pub fn cells_from_matrix(matrix: Vec<Vec<String>>) -> Vec<Vec<TableCell>> {
    matrix
        .into_iter()
        .enumerate()
        .map(|(row, cells)| {
            cells
                .into_iter()
                .enumerate()
                .map(|(col, text)| TableCell { text, row, col })
                .collect()
        })
        .collect()
}
