//! Structure-aware chunking over an extracted element sequence.

use std::sync::Arc;

use docstruct_core::config::ChunkerConfig;
use docstruct_core::{Chunk, ElementKind, StructuredElement};
use tracing::{debug, info};

use super::helpers::pack_sentences;
use super::token_counter::{count_or_fallback, TokenCounter, WhitespaceCounter};

/// Groups consecutive elements into chunks within a token budget.
///
/// Elements are never reordered or dropped. An element larger than the
/// budget is emitted alone, except paragraphs, which are split into
/// sentence-packed fragments first.
#[derive(Clone)]
pub struct HierarchicalChunker {
    config: ChunkerConfig,
    counter: Arc<dyn TokenCounter>,
}

impl Default for HierarchicalChunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

impl HierarchicalChunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self {
            config,
            counter: Arc::new(WhitespaceCounter),
        }
    }

    /// Replace the default whitespace counter. Failures of `counter` fall
    /// back to the whitespace count for that call.
    pub fn with_token_counter(mut self, counter: Arc<dyn TokenCounter>) -> Self {
        self.counter = counter;
        self
    }

    pub fn max_tokens(&self) -> usize {
        self.config.max_tokens
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        count_or_fallback(self.counter.as_ref(), text)
    }

    /// Chunk an element sequence in order.
    pub fn chunk(&self, elements: &[StructuredElement]) -> Vec<Chunk> {
        let mut accumulator = ChunkAccumulator::new(self);
        for element in elements {
            accumulator.push(element);
        }
        let chunks = accumulator.finish();
        info!(
            elements = elements.len(),
            chunks = chunks.len(),
            max_tokens = self.config.max_tokens,
            "chunked document"
        );
        chunks
    }

    fn build_chunk(&self, elements: Vec<StructuredElement>) -> Chunk {
        let tokens = elements
            .iter()
            .map(|e| self.count_tokens(&e.render_text()))
            .sum();
        Chunk::new(elements, tokens)
    }
}

/// Running buffer of one chunking pass.
struct ChunkAccumulator<'c> {
    chunker: &'c HierarchicalChunker,
    chunks: Vec<Chunk>,
    buffer: Vec<StructuredElement>,
    buffer_tokens: usize,
}

impl<'c> ChunkAccumulator<'c> {
    fn new(chunker: &'c HierarchicalChunker) -> Self {
        Self {
            chunker,
            chunks: Vec::new(),
            buffer: Vec::new(),
            buffer_tokens: 0,
        }
    }

    fn push(&mut self, element: &StructuredElement) {
        let budget = self.chunker.max_tokens();
        let tokens = self.chunker.count_tokens(&element.render_text());

        if tokens > budget {
            self.flush();
            if element.kind == ElementKind::Paragraph {
                self.split_paragraph(element);
            } else {
                debug!(kind = %element.kind, tokens, budget, "emitting oversized element alone");
                self.emit(vec![element.clone()]);
            }
        } else if self.buffer_tokens + tokens > budget {
            self.flush();
            self.buffer.push(element.clone());
            self.buffer_tokens = tokens;
        } else {
            self.buffer.push(element.clone());
            self.buffer_tokens += tokens;
        }
    }

    fn split_paragraph(&mut self, paragraph: &StructuredElement) {
        let pieces = pack_sentences(
            &paragraph.text,
            self.chunker.max_tokens(),
            self.chunker.counter.as_ref(),
        );
        debug!(pieces = pieces.len(), "split oversized paragraph");
        for piece in pieces {
            let mut fragment =
                StructuredElement::new(ElementKind::Paragraph, piece, paragraph.position);
            fragment.style = paragraph.style.clone();
            self.emit(vec![fragment]);
        }
    }

    fn emit(&mut self, elements: Vec<StructuredElement>) {
        self.chunks.push(self.chunker.build_chunk(elements));
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let elements = std::mem::take(&mut self.buffer);
            self.emit(elements);
        }
        self.buffer_tokens = 0;
    }

    fn finish(mut self) -> Vec<Chunk> {
        self.flush();
        self.chunks
    }
}
