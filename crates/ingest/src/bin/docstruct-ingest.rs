//! docstruct-ingest: extract, chunk and optionally query documents.
//!
//! Each file is dispatched by extension, structured, chunked within the token
//! budget and summarized. With `--query`, every chunk is indexed into an
//! in-memory index and the best matches are printed.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use docstruct_core::config::{load_dotenv, ChunkerConfig};
use docstruct_core::{Chunk, Config, MetadataSchema};
use docstruct_ingest::document::{extract_structure_with, ExtractorOptions};
use docstruct_ingest::index::{add_batched, file_id, records_for_chunks, MemoryIndex, VectorIndex};
use docstruct_ingest::HierarchicalChunker;

// ── CLI ─────────────────────────────────────────────────────────────

/// Structural extraction and chunking of .docx and .pdf files.
#[derive(Parser, Debug)]
#[command(name = "docstruct-ingest", version, about)]
struct Cli {
    /// Files to ingest.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Token budget per chunk (overrides CHUNK_MAX_TOKENS).
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Print chunks as JSON instead of a summary.
    #[arg(long)]
    json: bool,

    /// Index all chunks in memory and print the best matches for this query.
    #[arg(long)]
    query: Option<String>,

    /// Number of matches printed for `--query`.
    #[arg(long, default_value_t = 5)]
    top: usize,
}

// ── Per-file pipeline ───────────────────────────────────────────────

struct IngestedFile {
    /// Canonical path, used for record ids.
    id: String,
    name: String,
    elements: usize,
    chunks: Vec<Chunk>,
}

fn ingest_file(
    path: &Path,
    options: &ExtractorOptions,
    chunker: &HierarchicalChunker,
) -> anyhow::Result<IngestedFile> {
    let elements = extract_structure_with(path, options)
        .with_context(|| format!("failed to extract {}", path.display()))?;
    let chunks = chunker.chunk(&elements);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(IngestedFile {
        id: file_id(path),
        name,
        elements: elements.len(),
        chunks,
    })
}

fn print_summary(file: &IngestedFile) {
    println!(
        "{}: {} elements, {} chunks",
        file.name,
        file.elements,
        file.chunks.len()
    );
    for (i, chunk) in file.chunks.iter().enumerate() {
        let pages = chunk.content_pages();
        let range = match (pages.first(), pages.last()) {
            (Some(first), Some(last)) if first != last => format!("pages {first}-{last}"),
            (Some(first), _) => format!("page {first}"),
            _ => "no page".to_string(),
        };
        println!(
            "  #{i:<3} {:>5} tokens  {:>3} elements  {range}",
            chunk.tokens,
            chunk.content.len()
        );
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let options = ExtractorOptions {
        docx: config.docx.clone(),
        pdf: config.pdf.clone(),
    };
    let chunker = HierarchicalChunker::new(ChunkerConfig {
        max_tokens: cli.max_tokens.unwrap_or(config.chunker.max_tokens),
    });

    let mut ingested = Vec::new();
    for path in &cli.files {
        match ingest_file(path, &options, &chunker) {
            Ok(file) => ingested.push(file),
            Err(e) => warn!("skipping file: {e:#}"),
        }
    }
    info!(files = ingested.len(), requested = cli.files.len(), "ingestion finished");

    if cli.json {
        let all: Vec<&Chunk> = ingested.iter().flat_map(|f| f.chunks.iter()).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&all).context("failed to serialize chunks")?
        );
    } else {
        for file in &ingested {
            print_summary(file);
        }
    }

    if let Some(query) = &cli.query {
        let index =
            MemoryIndex::new(&config.index.collection).with_schema(MetadataSchema::chunk_records());
        for file in &ingested {
            let records = records_for_chunks(&file.id, &file.chunks);
            let report = add_batched(&index, &records, config.index.batch_size).await;
            if let Some(failure) = &report.failure {
                warn!(
                    file = %file.id,
                    batch = failure.batch,
                    cause = %failure.cause,
                    "indexing stopped"
                );
            }
        }

        let schema = MetadataSchema::chunk_records();
        let hits = index.search(query, cli.top).await?;
        println!("\nTop {} matches for {query:?}:", hits.len());
        for hit in hits {
            let row = hit.into_row(&schema)?;
            let source = row.field("source").and_then(|v| v.as_str()).unwrap_or("?");
            let preview: String = row.text.chars().take(80).collect();
            println!("  {:.3}  {}  [{source}]  {}", row.score, row.id, preview.replace('\n', " "));
        }
    }

    Ok(())
}
