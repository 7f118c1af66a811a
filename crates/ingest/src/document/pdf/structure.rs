//! Second pass: turns page layouts into structural elements.

use std::collections::HashSet;

use docstruct_core::config::PdfConfig;
use docstruct_core::{cells_from_matrix, ElementKind, Formatting, Position, StructuredElement};
use tracing::debug;

use super::boundary::RecurringBoundaries;
use super::layout::{PageLayout, TextLine};
use super::tables::{detect_tables, DetectedTable};

const BOLD_MARKERS: [&str; 2] = ["bold", "bd"];
const SENTENCE_END: [char; 3] = ['.', '?', '!'];

/// True when more than half of the line's fonts are bold faces.
pub fn is_bold_line<'a>(fonts: impl IntoIterator<Item = &'a str>) -> bool {
    let (bold, total) = fonts.into_iter().fold((0usize, 0usize), |(bold, total), font| {
        let lower = font.to_lowercase();
        let is_bold = BOLD_MARKERS.iter().any(|m| lower.contains(m));
        (bold + usize::from(is_bold), total + 1)
    });
    total > 0 && bold * 2 > total
}

/// Page content in reading order.
enum PageItem<'p> {
    Line(&'p TextLine),
    Table(DetectedTable),
}

impl PageItem<'_> {
    fn top(&self) -> f64 {
        match self {
            PageItem::Line(line) => line.top,
            PageItem::Table(table) => table.top,
        }
    }
}

/// Lines waiting to be joined into one paragraph.
#[derive(Default)]
struct ParagraphBuffer {
    lines: Vec<String>,
    previous_top: Option<f64>,
}

/// Walks pages in order, owning the running section index.
pub struct PageStructurer<'a> {
    config: &'a PdfConfig,
    boundaries: &'a RecurringBoundaries,
    section_index: usize,
    elements: Vec<StructuredElement>,
}

impl<'a> PageStructurer<'a> {
    pub fn new(config: &'a PdfConfig, boundaries: &'a RecurringBoundaries) -> Self {
        Self {
            config,
            boundaries,
            section_index: 0,
            elements: Vec::new(),
        }
    }

    pub fn structure_page(&mut self, page: &PageLayout) {
        let before = self.elements.len();
        let page_number = page.number as i32;

        // Recurring header/footer lines never reach table detection.
        let body: Vec<TextLine> = page
            .lines
            .iter()
            .filter(|line| !line.text.is_empty() && !self.boundaries.contains(&line.text))
            .cloned()
            .collect();
        let tables = detect_tables(&body, self.config);
        let table_lines: HashSet<usize> = tables
            .iter()
            .flat_map(|t| t.lines.iter().copied())
            .collect();

        let mut items: Vec<PageItem<'_>> = body
            .iter()
            .enumerate()
            .filter(|(i, _)| !table_lines.contains(i))
            .map(|(_, line)| PageItem::Line(line))
            .chain(tables.into_iter().map(PageItem::Table))
            .collect();
        items.sort_by(|a, b| a.top().total_cmp(&b.top()));

        let mut buffer = ParagraphBuffer::default();
        for item in items {
            match item {
                PageItem::Table(table) => {
                    self.flush(&mut buffer, page_number);
                    self.push_table(table, page_number);
                }
                PageItem::Line(line) if is_bold_line(line.fonts()) => {
                    self.flush(&mut buffer, page_number);
                    self.push_heading(&line.text, page_number);
                }
                PageItem::Line(line) => self.push_line(&mut buffer, line, page_number),
            }
        }
        self.flush(&mut buffer, page_number);

        debug!(
            page = page.number,
            lines = page.lines.len(),
            elements = self.elements.len() - before,
            "structured pdf page"
        );
    }

    pub fn finish(self) -> Vec<StructuredElement> {
        self.elements
    }

    fn position(&self, page_number: i32) -> Position {
        Position::new(self.section_index, page_number)
    }

    fn push_heading(&mut self, text: &str, page_number: i32) {
        let element = StructuredElement::new(ElementKind::Heading, text, self.position(page_number))
            .with_style("Heading 1")
            .with_heading_level(1)
            .with_formatting(Formatting::bold())
            .with_list_level(0.0);
        self.elements.push(element);
        self.section_index += 1;
    }

    fn push_table(&mut self, table: DetectedTable, page_number: i32) {
        let cells = cells_from_matrix(table.rows);
        let element = StructuredElement::table(cells, self.position(page_number))
            .with_style("Table Grid")
            .with_list_level(0.0);
        self.elements.push(element);
    }

    fn push_line(&mut self, buffer: &mut ParagraphBuffer, line: &TextLine, page_number: i32) {
        if let Some(previous) = buffer.previous_top {
            if (line.top - previous).abs() > self.config.paragraph_gap {
                self.flush(buffer, page_number);
            }
        }
        buffer.lines.push(line.text.clone());
        buffer.previous_top = Some(line.top);

        if line.text.ends_with(SENTENCE_END) {
            self.flush(buffer, page_number);
        }
    }

    /// Emit buffered lines as one paragraph. The previous line position is
    /// kept so the gap rule still applies to the next line.
    fn flush(&mut self, buffer: &mut ParagraphBuffer, page_number: i32) {
        if buffer.lines.is_empty() {
            return;
        }
        let text = std::mem::take(&mut buffer.lines).join(" ");
        let position = self.position(page_number);
        let element = StructuredElement::new(ElementKind::Paragraph, text, position)
            .with_style("Normal")
            .with_list_level(0.0);
        self.elements.push(element);
    }
}
