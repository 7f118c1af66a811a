use docstruct_core::config::PdfConfig;
use docstruct_core::{ElementKind, Position};
use docstruct_ingest::document::pdf::{extract_pdf, read_pages};
use docstruct_ingest::document::{extract_structure_from_bytes, ExtractorOptions};

use crate::helpers::{bold, line, pdf_document, PdfLine};

/// Four pages, each stamped CONFIDENTIAL at the top.
fn report() -> Vec<u8> {
    let stamp = || line(250, 760, "CONFIDENTIAL");
    let pages: Vec<Vec<PdfLine>> = vec![
        vec![
            stamp(),
            bold(72, 700, "Introduction"),
            line(72, 680, "This report covers"),
            line(72, 666, "the first quarter."),
        ],
        vec![
            stamp(),
            line(72, 600, "Region"),
            line(300, 600, "Sales"),
            line(72, 585, "North"),
            line(300, 585, "120"),
            line(72, 500, "Closing remarks."),
        ],
        vec![stamp(), line(72, 400, "Page three text.")],
        vec![stamp(), line(72, 400, "Page four text.")],
    ];
    pdf_document(pages)
}

fn config() -> PdfConfig {
    PdfConfig {
        paragraph_gap: 16.0,
        ..PdfConfig::default()
    }
}

#[test]
fn test_reads_positioned_lines() {
    let bytes = report();
    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let pages = read_pages(&doc).unwrap();
    assert_eq!(pages.len(), 4);
    assert_eq!(pages[0].height, 792.0);

    let first: Vec<_> = pages[0].lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        first,
        vec!["CONFIDENTIAL", "Introduction", "This report covers", "the first quarter."]
    );
    // Baseline 700 from the bottom is 92 from the top; the line box starts 12 higher.
    assert_eq!(pages[0].lines[1].top, 80.0);
    assert_eq!(pages[0].lines[1].spans[0].font, "Helvetica-Bold");
}

#[test]
fn test_extracts_structure() {
    let elements = extract_pdf(&report(), &config()).unwrap();
    let summary: Vec<_> = elements
        .iter()
        .map(|e| (e.kind, e.text.as_str(), e.position))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ElementKind::Heading, "Introduction", Position::new(0, 1)),
            (
                ElementKind::Paragraph,
                "This report covers the first quarter.",
                Position::new(1, 1)
            ),
            (ElementKind::Table, "", Position::new(1, 2)),
            (ElementKind::Paragraph, "Closing remarks.", Position::new(1, 2)),
            (ElementKind::Paragraph, "Page three text.", Position::new(1, 3)),
            (ElementKind::Paragraph, "Page four text.", Position::new(1, 4)),
        ]
    );
}

#[test]
fn test_recurring_header_never_emitted() {
    let elements = extract_pdf(&report(), &config()).unwrap();
    assert!(elements.iter().all(|e| !e.text.contains("CONFIDENTIAL")));
}

#[test]
fn test_table_content_and_defaults() {
    let elements = extract_pdf(&report(), &config()).unwrap();
    let table = elements.iter().find(|e| e.kind == ElementKind::Table).unwrap();
    let rows: Vec<Vec<&str>> = table
        .content
        .iter()
        .map(|row| row.iter().map(|c| c.text.as_str()).collect())
        .collect();
    assert_eq!(rows, vec![vec!["Region", "Sales"], vec!["North", "120"]]);
    assert_eq!(table.style.as_deref(), Some("Table Grid"));
    assert_eq!(table.list_level, Some(0.0));

    let heading = &elements[0];
    assert!(heading.formatting.bold);
    assert_eq!(heading.heading_level, 1);
    assert_eq!(heading.style.as_deref(), Some("Heading 1"));
}

#[test]
fn test_default_gap_splits_every_line() {
    // 14pt line spacing exceeds the default 10-unit paragraph gap.
    let elements = extract_pdf(&report(), &PdfConfig::default()).unwrap();
    let texts: Vec<_> = elements
        .iter()
        .filter(|e| e.position.page_number == Some(1))
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(texts, vec!["Introduction", "This report covers", "the first quarter."]);
}

#[test]
fn test_single_page_band_text_is_recurring() {
    // With one page every band line appears on 100% of pages.
    let bytes = pdf_document(vec![vec![
        line(72, 770, "Top banner"),
        line(72, 400, "Body line."),
    ]]);
    let elements = extract_pdf(&bytes, &PdfConfig::default()).unwrap();
    let texts: Vec<_> = elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Body line."]);
}

#[test]
fn test_empty_page() {
    let bytes = pdf_document(vec![vec![]]);
    assert!(extract_pdf(&bytes, &PdfConfig::default()).unwrap().is_empty());
}

#[test]
fn test_dispatch_from_bytes() {
    let elements =
        extract_structure_from_bytes(&report(), "q1.Pdf", &ExtractorOptions::default()).unwrap();
    assert!(!elements.is_empty());
}
