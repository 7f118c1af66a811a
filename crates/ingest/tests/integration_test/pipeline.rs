use std::fs;

use docstruct_core::config::ChunkerConfig;
use docstruct_core::{ElementKind, MetadataSchema};
use docstruct_ingest::document::{extract_structure, extract_structure_with, ExtractorOptions};
use docstruct_ingest::index::{add_batched, file_id, records_for_chunks, MemoryIndex, VectorIndex};
use docstruct_ingest::{merge_text, ExtractionError, HierarchicalChunker};

use crate::helpers::{docx_package, line, paragraph, pdf_document};

#[test]
fn test_extract_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("handbook.docx");
    fs::write(&path, docx_package(&paragraph(Some("Heading1"), "Welcome"))).unwrap();

    let elements = extract_structure(&path).unwrap();
    assert!(elements
        .iter()
        .any(|e| e.kind == ElementKind::Heading && e.text == "Welcome"));
}

#[test]
fn test_unsupported_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "plain text").unwrap();

    let err = extract_structure(&path).unwrap_err();
    assert!(matches!(err, ExtractionError::UnsupportedFormat(ref ext) if ext == ".txt"));
}

#[test]
fn test_corrupt_pdf_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    fs::write(&path, b"%PDF-1.5 truncated").unwrap();

    let err = extract_structure_with(&path, &ExtractorOptions::default()).unwrap_err();
    assert!(matches!(err, ExtractionError::Pdf(_)));
}

#[test]
fn test_docx_chunks_cover_every_element() {
    let body: String = (0..45)
        .map(|i| paragraph(None, &format!("Paragraph number {i} has six words")))
        .collect();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.docx");
    fs::write(&path, docx_package(&body)).unwrap();

    let elements = extract_structure(&path).unwrap();
    // No sections in the body, so only the 45 paragraphs.
    assert_eq!(elements.len(), 45);

    let chunker = HierarchicalChunker::new(ChunkerConfig { max_tokens: 50 });
    let chunks = chunker.chunk(&elements);
    let total: usize = chunks.iter().map(|c| c.content.len()).sum();
    assert_eq!(total, 45);
    assert!(chunks.iter().all(|c| c.tokens <= 50));
    // 8 paragraphs of 6 tokens fit in 50.
    assert_eq!(chunks[0].content.len(), 8);
    assert_eq!(chunks.last().unwrap().page_numbers, vec![3]);
}

#[tokio::test]
async fn test_extract_chunk_index_search() {
    let pdf = pdf_document(vec![
        vec![
            line(72, 700, "Fire safety procedures apply to the warehouse."),
            line(72, 600, "Quarterly revenue grew in every region."),
        ],
        vec![line(72, 700, "Staff must complete safety training yearly.")],
    ]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ops.pdf");
    fs::write(&path, pdf).unwrap();

    let elements = extract_structure(&path).unwrap();
    assert_eq!(elements.len(), 3);

    let chunks = HierarchicalChunker::new(ChunkerConfig { max_tokens: 8 }).chunk(&elements);
    assert_eq!(chunks.len(), 3);
    assert_eq!(merge_text(chunks[2].elements()), "Staff must complete safety training yearly.");

    let index = MemoryIndex::new("documents").with_schema(MetadataSchema::chunk_records());
    let id = file_id(&path);
    let records = records_for_chunks(&id, &chunks);
    let report = add_batched(&index, &records, 2).await;
    assert_eq!(report.batches_total, 2);
    assert!(report.is_complete());
    assert_eq!(index.len().await, 3);

    // Re-ingesting the same file keeps one record per chunk.
    add_batched(&index, &records, 2).await;
    assert_eq!(index.len().await, 3);

    let hits = index.search("warehouse fire safety", 1).await.unwrap();
    let row = hits
        .into_iter()
        .next()
        .unwrap()
        .into_row(&MetadataSchema::chunk_records())
        .unwrap();
    assert_eq!(row.id, format!("{id}_0"));
    assert_eq!(row.field("source").and_then(|v| v.as_str()), Some(id.as_str()));
    assert_eq!(row.field("page_numbers").and_then(|v| v.as_str()), Some("1"));
    assert!(row.score > 0.0);
}

#[tokio::test]
async fn test_same_named_files_do_not_collide() {
    let index = MemoryIndex::new("documents").with_schema(MetadataSchema::chunk_records());
    let chunker = HierarchicalChunker::new(ChunkerConfig { max_tokens: 50 });
    let dirs = [tempfile::tempdir().unwrap(), tempfile::tempdir().unwrap()];
    let texts = ["Boiler maintenance schedule.", "Canteen opening hours."];

    for (dir, text) in dirs.iter().zip(texts) {
        let path = dir.path().join("notes.pdf");
        fs::write(&path, pdf_document(vec![vec![line(72, 700, text)]])).unwrap();
        let chunks = chunker.chunk(&extract_structure(&path).unwrap());
        let records = records_for_chunks(&file_id(&path), &chunks);
        assert!(add_batched(&index, &records, 10).await.is_complete());
    }

    // Both files keep their single chunk.
    assert_eq!(index.len().await, 2);
    let hits = index.search("canteen opening hours", 2).await.unwrap();
    assert_eq!(hits[0].document, "Canteen opening hours.");
    assert!(hits[0].id.ends_with("notes.pdf_0"));
    assert_ne!(hits[0].id, hits[1].id);
}
