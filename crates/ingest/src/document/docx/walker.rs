use docstruct_core::config::DocxConfig;
use docstruct_core::{
    cells_from_matrix, ElementKind, Formatting, Position, StructuredElement, FOOTER_PAGE,
    HEADER_PAGE,
};
use tracing::debug;

use super::{Block, SectionParts, WordDocument, WordParagraph, WordTable};

const LIST_STYLE_KEYWORDS: [&str; 3] = ["list", "bullet", "number"];

/// Heading level from a style named `Heading <n>`; 0 when absent or unparsable.
pub fn detect_heading_level(style: &str) -> u32 {
    if !style.starts_with("Heading") {
        return 0;
    }
    style
        .split(' ')
        .nth(1)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

pub fn is_list_style(style: &str) -> bool {
    let lower = style.to_lowercase();
    LIST_STYLE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Walks a [`WordDocument`] once, owning the running section and paragraph
/// counters.
pub struct BodyWalker<'a> {
    config: &'a DocxConfig,
    elements: Vec<StructuredElement>,
    section_index: usize,
    paragraph_counter: usize,
}

impl<'a> BodyWalker<'a> {
    pub fn new(config: &'a DocxConfig) -> Self {
        Self {
            config,
            elements: Vec::new(),
            section_index: 0,
            paragraph_counter: 0,
        }
    }

    pub fn walk(mut self, document: &WordDocument) -> Vec<StructuredElement> {
        self.emit_headers_and_footers(&document.sections);
        for block in &document.body {
            self.visit(block);
        }
        debug!(
            blocks = document.body.len(),
            paragraphs = self.paragraph_counter,
            elements = self.elements.len(),
            "walked docx body"
        );
        self.elements
    }

    fn emit_headers_and_footers(&mut self, sections: &[SectionParts]) {
        for (i, section) in sections.iter().enumerate() {
            if !(section.header_linked && i > 0) {
                for text in &section.header {
                    self.push_boundary(ElementKind::Header, text, i, HEADER_PAGE);
                }
            }
            for text in &section.footer {
                self.push_boundary(ElementKind::Footer, text, i, FOOTER_PAGE);
            }
        }
    }

    fn push_boundary(&mut self, kind: ElementKind, text: &str, section: usize, page: i32) {
        let text = text.trim();
        if !text.is_empty() {
            self.elements
                .push(StructuredElement::new(kind, text, Position::new(section, page)));
        }
    }

    fn estimated_page(&self) -> i32 {
        (self.paragraph_counter / self.config.paragraphs_per_page.max(1) + 1) as i32
    }

    fn visit(&mut self, block: &Block) {
        let position = Position::new(self.section_index, self.estimated_page());
        match block {
            Block::Paragraph(paragraph) => {
                if let Some(element) = paragraph_element(paragraph, position) {
                    self.elements.push(element);
                    self.paragraph_counter += 1;
                }
            }
            Block::Table(table) => self.elements.push(table_element(table, position)),
        }
        // Skipped paragraphs still consume a section index.
        self.section_index += 1;
    }
}

fn paragraph_element(paragraph: &WordParagraph, position: Position) -> Option<StructuredElement> {
    let text = paragraph.text.trim();
    if text.is_empty() {
        return None;
    }

    let style = paragraph.style.as_str();
    let heading_level = detect_heading_level(style);
    let kind = if heading_level > 0 {
        ElementKind::Heading
    } else if is_list_style(style) {
        ElementKind::List
    } else {
        ElementKind::Paragraph
    };

    let formatting = paragraph
        .runs
        .iter()
        .fold(Formatting::default(), |acc, run| Formatting {
            bold: acc.bold || run.bold,
            italic: acc.italic || run.italic,
            underline: acc.underline || run.underline,
        });

    Some(
        StructuredElement::new(kind, text, position)
            .with_style(style)
            .with_heading_level(heading_level)
            .with_formatting(formatting)
            .with_list_level(paragraph.left_indent.unwrap_or(0.0)),
    )
}

fn table_element(table: &WordTable, position: Position) -> StructuredElement {
    let matrix = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.trim().to_string()).collect())
        .collect();
    StructuredElement::table(cells_from_matrix(matrix), position)
}
