use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub chunker: ChunkerConfig,
    pub docx: DocxConfig,
    pub pdf: PdfConfig,
    pub index: IndexConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DOCSTRUCT_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DOCSTRUCT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            chunker: ChunkerConfig::from_env_profiled(p),
            docx: DocxConfig::from_env_profiled(p),
            pdf: PdfConfig::from_env_profiled(p),
            index: IndexConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  chunker:  max_tokens={}", self.chunker.max_tokens);
        tracing::info!("  docx:     paragraphs_per_page={}", self.docx.paragraphs_per_page);
        tracing::info!(
            "  pdf:      bands={}/{}, recurring_ratio={}, paragraph_gap={}, column_gap={}, min_table_rows={}",
            self.pdf.top_band,
            self.pdf.bottom_band,
            self.pdf.recurring_ratio,
            self.pdf.paragraph_gap,
            self.pdf.column_gap,
            self.pdf.min_table_rows,
        );
        tracing::info!(
            "  index:    collection={}, batch_size={}",
            self.index.collection,
            self.index.batch_size
        );
    }
}

// ── Chunker ───────────────────────────────────────────────────

pub const DEFAULT_MAX_TOKENS: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Token budget of a single chunk.
    pub max_tokens: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ChunkerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_tokens: profiled_env_usize(p, "CHUNK_MAX_TOKENS", DEFAULT_MAX_TOKENS),
        }
    }
}

// ── DOCX extraction ───────────────────────────────────────────

pub const DEFAULT_PARAGRAPHS_PER_PAGE: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxConfig {
    /// Emitted paragraphs per estimated page.
    pub paragraphs_per_page: usize,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            paragraphs_per_page: DEFAULT_PARAGRAPHS_PER_PAGE,
        }
    }
}

impl DocxConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            paragraphs_per_page: profiled_env_usize(
                p,
                "DOCX_PARAGRAPHS_PER_PAGE",
                DEFAULT_PARAGRAPHS_PER_PAGE,
            )
            .max(1),
        }
    }
}

// ── PDF extraction ────────────────────────────────────────────

pub const DEFAULT_TOP_BAND: f64 = 0.1;
pub const DEFAULT_BOTTOM_BAND: f64 = 0.9;
pub const DEFAULT_RECURRING_RATIO: f64 = 0.8;
pub const DEFAULT_PARAGRAPH_GAP: f64 = 10.0;
pub const DEFAULT_COLUMN_GAP: f64 = 15.0;
pub const DEFAULT_MIN_TABLE_ROWS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    /// Lines whose top lies above `height * top_band` are header candidates.
    pub top_band: f64,
    /// Lines whose top lies below `height * bottom_band` are footer candidates.
    pub bottom_band: f64,
    /// Fraction of pages a boundary line must appear on to be dropped.
    pub recurring_ratio: f64,
    /// Vertical distance between lines that starts a new paragraph.
    pub paragraph_gap: f64,
    /// Horizontal distance between spans that separates table cells.
    pub column_gap: f64,
    /// Minimum number of aligned rows that form a table.
    pub min_table_rows: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            top_band: DEFAULT_TOP_BAND,
            bottom_band: DEFAULT_BOTTOM_BAND,
            recurring_ratio: DEFAULT_RECURRING_RATIO,
            paragraph_gap: DEFAULT_PARAGRAPH_GAP,
            column_gap: DEFAULT_COLUMN_GAP,
            min_table_rows: DEFAULT_MIN_TABLE_ROWS,
        }
    }
}

impl PdfConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_band: profiled_env_f64(p, "PDF_TOP_BAND", DEFAULT_TOP_BAND),
            bottom_band: profiled_env_f64(p, "PDF_BOTTOM_BAND", DEFAULT_BOTTOM_BAND),
            recurring_ratio: profiled_env_f64(p, "PDF_RECURRING_RATIO", DEFAULT_RECURRING_RATIO),
            paragraph_gap: profiled_env_f64(p, "PDF_PARAGRAPH_GAP", DEFAULT_PARAGRAPH_GAP),
            column_gap: profiled_env_f64(p, "PDF_COLUMN_GAP", DEFAULT_COLUMN_GAP),
            min_table_rows: profiled_env_usize(p, "PDF_MIN_TABLE_ROWS", DEFAULT_MIN_TABLE_ROWS)
                .max(1),
        }
    }
}

// ── Indexing ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub collection: String,
    /// Records submitted per `add` call.
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            collection: "documents".to_string(),
            batch_size: 1000,
        }
    }
}

impl IndexConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            collection: profiled_env_or(p, "INDEX_COLLECTION", "documents"),
            batch_size: profiled_env_usize(p, "INDEX_BATCH_SIZE", 1000).max(1),
        }
    }
}
