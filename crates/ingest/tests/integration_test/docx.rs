use docstruct_core::config::DocxConfig;
use docstruct_core::{ElementKind, Formatting, Position};
use docstruct_ingest::document::docx::extract_docx;
use docstruct_ingest::document::{extract_structure_from_bytes, ExtractorOptions};
use docstruct_ingest::ExtractionError;

use crate::helpers::{docx_package, document_xml, paragraph, zip_parts};

/// Two sections: the first ends at the paragraph carrying a `w:sectPr` with
/// its own header and footer, the second has none and is linked.
fn sample_body() -> String {
    [
        paragraph(Some("Heading1"), "Introduction"),
        r#"<w:p><w:pPr><w:ind w:left="720"/></w:pPr>
            <w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Bold start </w:t></w:r>
            <w:r><w:rPr><w:i w:val="0"/></w:rPr><w:t>then plain.</w:t></w:r></w:p>"#
            .to_string(),
        paragraph(Some("ListBullet"), "First item"),
        paragraph(None, "   "),
        r#"<w:tbl>
            <w:tr><w:tc><w:p><w:r><w:t> Item </w:t></w:r></w:p></w:tc>
                  <w:tc><w:p><w:r><w:t>Qty</w:t></w:r></w:p></w:tc></w:tr>
            <w:tr><w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Total: 5</w:t></w:r></w:p></w:tc></w:tr>
            <w:tr><w:tc><w:p/></w:tc><w:tc><w:p><w:r><w:t>7</w:t></w:r></w:p></w:tc></w:tr>
           </w:tbl>"#
            .to_string(),
        r#"<w:p><w:pPr><w:sectPr>
            <w:headerReference w:type="default" r:id="rId10"/>
            <w:footerReference w:type="default" r:id="rId11"/>
           </w:sectPr></w:pPr><w:r><w:t>End of part one.</w:t></w:r></w:p>"#
            .to_string(),
        paragraph(None, "Second section text."),
        "<w:sectPr/>".to_string(),
    ]
    .concat()
}

#[test]
fn test_extracts_full_package() {
    let bytes = docx_package(&sample_body());
    let elements = extract_docx(&bytes, &DocxConfig::default()).unwrap();

    let summary: Vec<_> = elements
        .iter()
        .map(|e| (e.kind, e.text.as_str(), e.position.section_index, e.position.page_number))
        .collect();
    assert_eq!(
        summary,
        vec![
            (ElementKind::Header, "Company Header", 0, Some(1)),
            (ElementKind::Footer, "Footer text", 0, Some(-1)),
            (ElementKind::Footer, "Footer text", 1, Some(-1)),
            (ElementKind::Heading, "Introduction", 0, Some(1)),
            (ElementKind::Paragraph, "Bold start then plain.", 1, Some(1)),
            (ElementKind::List, "First item", 2, Some(1)),
            (ElementKind::Table, "", 4, Some(1)),
            (ElementKind::Paragraph, "End of part one.", 5, Some(1)),
            (ElementKind::Paragraph, "Second section text.", 6, Some(1)),
        ]
    );
}

#[test]
fn test_paragraph_properties() {
    let bytes = docx_package(&sample_body());
    let elements = extract_docx(&bytes, &DocxConfig::default()).unwrap();

    let heading = &elements[3];
    assert_eq!(heading.style.as_deref(), Some("Heading 1"));
    assert_eq!(heading.heading_level, 1);

    let body = &elements[4];
    assert_eq!(body.style.as_deref(), Some("Normal"));
    assert_eq!(body.list_level, Some(36.0));
    assert_eq!(
        body.formatting,
        Formatting {
            bold: true,
            italic: false,
            underline: false
        }
    );

    let list = &elements[5];
    assert_eq!(list.style.as_deref(), Some("List Bullet"));
    assert_eq!(list.list_level, Some(0.0));
}

#[test]
fn test_table_cells() {
    let bytes = docx_package(&sample_body());
    let elements = extract_docx(&bytes, &DocxConfig::default()).unwrap();
    let table = &elements[6];

    let rows: Vec<Vec<&str>> = table
        .content
        .iter()
        .map(|row| row.iter().map(|c| c.text.as_str()).collect())
        .collect();
    assert_eq!(
        rows,
        vec![vec!["Item", "Qty"], vec!["Total: 5", "Total: 5"], vec!["", "7"]]
    );
    assert_eq!(table.content[2][1].row, 2);
    assert_eq!(table.content[2][1].col, 1);
    assert_eq!(table.style, None);
}

#[test]
fn test_page_estimate_from_config() {
    let body: String = (0..5)
        .map(|i| paragraph(None, &format!("Paragraph {i}")))
        .collect();
    let bytes = zip_parts(&[("word/document.xml", document_xml(&body))]);
    let config = DocxConfig {
        paragraphs_per_page: 2,
    };
    let pages: Vec<_> = extract_docx(&bytes, &config)
        .unwrap()
        .iter()
        .map(|e| e.position.page_number.unwrap())
        .collect();
    assert_eq!(pages, vec![1, 1, 2, 2, 3]);
}

#[test]
fn test_package_without_styles_or_sections() {
    let bytes = zip_parts(&[("word/document.xml", document_xml(&paragraph(None, "Only text")))]);
    let elements = extract_docx(&bytes, &DocxConfig::default()).unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].position, Position::new(0, 1));
    assert_eq!(elements[0].style.as_deref(), Some(""));
}

#[test]
fn test_empty_body() {
    let bytes = zip_parts(&[("word/document.xml", document_xml(""))]);
    assert!(extract_docx(&bytes, &DocxConfig::default()).unwrap().is_empty());
}

#[test]
fn test_missing_document_part() {
    let bytes = zip_parts(&[("word/styles.xml", String::from("<x/>"))]);
    let err = extract_docx(&bytes, &DocxConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractionError::Docx(_)));
}

#[test]
fn test_malformed_xml() {
    let bytes = zip_parts(&[("word/document.xml", String::from("<w:document><w:body>"))]);
    let err = extract_docx(&bytes, &DocxConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractionError::Xml { ref part, .. } if part == "word/document.xml"));
}

#[test]
fn test_dispatch_from_bytes_is_case_insensitive() {
    let bytes = docx_package(&sample_body());
    let elements =
        extract_structure_from_bytes(&bytes, "REPORT.DOCX", &ExtractorOptions::default()).unwrap();
    assert_eq!(elements.len(), 9);
}
