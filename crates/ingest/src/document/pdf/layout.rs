//! Positioned text model of a PDF page.
//!
//! Coordinates are top-down: `top` grows towards the bottom of the page, so
//! sorting by `top` gives reading order from top to bottom.

/// Width of a glyph without font metrics, in em.
pub(crate) const DEFAULT_GLYPH_WIDTH: f64 = 0.5;

/// Gap (in em) between two spans on a line that counts as a word break.
const WORD_GAP_EM: f64 = 0.15;

/// Text drawn by one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Left edge, in page units.
    pub x: f64,
    /// Baseline, top-down.
    pub baseline: f64,
    pub width: f64,
    pub size: f64,
    /// Base font name without subset prefix (e.g. `Helvetica-Bold`).
    pub font: String,
    pub text: String,
}

impl TextSpan {
    /// Span with a width estimated from its character count.
    pub fn new(x: f64, baseline: f64, text: &str, font: &str, size: f64) -> Self {
        Self {
            x,
            baseline,
            width: text.chars().count() as f64 * size * DEFAULT_GLYPH_WIDTH,
            size,
            font: font.to_string(),
            text: text.to_string(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Top of the span's line box.
    pub fn top(&self) -> f64 {
        self.baseline - self.size
    }
}

/// Spans sharing a baseline, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub top: f64,
    pub text: String,
    pub spans: Vec<TextSpan>,
}

impl TextLine {
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        let top = spans.iter().map(TextSpan::top).fold(f64::INFINITY, f64::min);
        let text = join_spans(&spans).trim().to_string();
        Self { top, text, spans }
    }

    /// Font names of the line's spans, one per span.
    pub fn fonts(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().map(|s| s.font.as_str())
    }
}

/// Concatenate spans, inserting a space where the horizontal gap between two
/// spans is wide enough to separate words.
pub(crate) fn join_spans(spans: &[TextSpan]) -> String {
    let mut out = String::new();
    let mut previous: Option<&TextSpan> = None;
    for span in spans {
        if let Some(prev) = previous {
            let gap = span.x - prev.right();
            if gap > WORD_GAP_EM * span.size
                && !out.ends_with(char::is_whitespace)
                && !span.text.starts_with(char::is_whitespace)
            {
                out.push(' ');
            }
        }
        out.push_str(&span.text);
        previous = Some(span);
    }
    out
}

/// One physical page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// 1-based page index.
    pub number: usize,
    pub height: f64,
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    pub fn new(number: usize, height: f64, spans: Vec<TextSpan>) -> Self {
        Self {
            number,
            height,
            lines: group_lines(spans),
        }
    }
}

/// Group spans into lines by baseline and order the lines top to bottom.
/// Whitespace-only spans are dropped.
pub fn group_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.retain(|s| !s.text.trim().is_empty());
    spans.sort_by(|a, b| a.baseline.total_cmp(&b.baseline).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    for span in spans {
        if let Some(first) = current.first() {
            let tolerance = (0.3 * first.size.min(span.size)).max(2.0);
            if (span.baseline - first.baseline).abs() > tolerance {
                lines.push(TextLine::from_spans(std::mem::take(&mut current)));
            }
        }
        current.push(span);
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_spans_by_baseline() {
        let lines = group_lines(vec![
            TextSpan::new(200.0, 100.5, "world", "Times", 12.0),
            TextSpan::new(72.0, 130.0, "Second line", "Times", 12.0),
            TextSpan::new(72.0, 100.0, "Hello", "Times", 12.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Hello world");
        assert_eq!(lines[0].top, 88.0);
        assert_eq!(lines[1].text, "Second line");
    }

    #[test]
    fn adjacent_spans_join_without_space() {
        // "Hel" is 3 * 6 = 18 units wide, so "lo" starts right where it ends.
        let lines = group_lines(vec![
            TextSpan::new(72.0, 100.0, "Hel", "Times", 12.0),
            TextSpan::new(90.0, 100.0, "lo", "Times", 12.0),
        ]);
        assert_eq!(lines[0].text, "Hello");
    }

    #[test]
    fn whitespace_spans_are_dropped() {
        let lines = group_lines(vec![TextSpan::new(72.0, 100.0, "   ", "Times", 12.0)]);
        assert!(lines.is_empty());
    }

    #[test]
    fn fonts_listed_per_span() {
        let line = TextLine::from_spans(vec![
            TextSpan::new(72.0, 100.0, "A", "Arial-Bold", 12.0),
            TextSpan::new(100.0, 100.0, "B", "Arial", 12.0),
        ]);
        assert_eq!(line.fonts().collect::<Vec<_>>(), vec!["Arial-Bold", "Arial"]);
    }
}
