use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::element::{ElementKind, StructuredElement};

/// Unique identifier of a chunk.
pub type ChunkId = Uuid;

/// An element as stored inside a chunk, with its page lifted to the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkElement {
    #[serde(flatten)]
    pub element: StructuredElement,
    pub page_number: Option<i32>,
}

impl From<StructuredElement> for ChunkElement {
    fn from(element: StructuredElement) -> Self {
        let page_number = element.position.page_number;
        Self {
            element,
            page_number,
        }
    }
}

/// A token-budgeted group of elements ready for indexing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub content: Vec<ChunkElement>,
    pub tokens: usize,
    /// Sorted, deduplicated pages of the contained elements.
    pub page_numbers: Vec<i32>,
}

impl Chunk {
    /// Assemble a chunk; `tokens` is supplied by the caller's counter.
    pub fn new(elements: Vec<StructuredElement>, tokens: usize) -> Self {
        let page_numbers = elements
            .iter()
            .filter_map(|e| e.position.page_number)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            id: Uuid::new_v4(),
            content: elements.into_iter().map(ChunkElement::from).collect(),
            tokens,
            page_numbers,
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &StructuredElement> {
        self.content.iter().map(|c| &c.element)
    }

    /// Pages for range reporting: ignores DOCX header/footer sentinels and
    /// any non-positive page.
    pub fn content_pages(&self) -> Vec<i32> {
        self.content
            .iter()
            .filter(|c| !matches!(c.element.kind, ElementKind::Header | ElementKind::Footer))
            .filter_map(|c| c.page_number)
            .filter(|p| *p >= 1)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
