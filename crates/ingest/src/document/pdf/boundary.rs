use std::collections::{HashMap, HashSet};

use docstruct_core::config::PdfConfig;
use tracing::debug;

use super::layout::PageLayout;

/// Header and footer texts repeated across most pages of a document.
#[derive(Debug, Default, Clone)]
pub struct RecurringBoundaries {
    top: HashSet<String>,
    bottom: HashSet<String>,
}

impl RecurringBoundaries {
    /// Count line texts in the top and bottom bands of every page and keep
    /// those appearing on at least `recurring_ratio` of the pages.
    pub fn detect(pages: &[PageLayout], config: &PdfConfig) -> Self {
        let mut top_counts: HashMap<&str, usize> = HashMap::new();
        let mut bottom_counts: HashMap<&str, usize> = HashMap::new();

        for page in pages {
            for line in &page.lines {
                if line.text.is_empty() {
                    continue;
                }
                if line.top < page.height * config.top_band {
                    *top_counts.entry(line.text.as_str()).or_default() += 1;
                } else if line.top > page.height * config.bottom_band {
                    *bottom_counts.entry(line.text.as_str()).or_default() += 1;
                }
            }
        }

        let threshold = pages.len() as f64 * config.recurring_ratio;
        let recurring = |counts: HashMap<&str, usize>| -> HashSet<String> {
            counts
                .into_iter()
                .filter(|(_, count)| *count as f64 >= threshold)
                .map(|(text, _)| text.to_string())
                .collect()
        };

        let boundaries = Self {
            top: recurring(top_counts),
            bottom: recurring(bottom_counts),
        };
        debug!(
            pages = pages.len(),
            top = boundaries.top.len(),
            bottom = boundaries.bottom.len(),
            "detected recurring boundary texts"
        );
        boundaries
    }

    pub fn contains(&self, text: &str) -> bool {
        self.top.contains(text) || self.bottom.contains(text)
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }
}
