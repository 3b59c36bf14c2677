//! Positioned text for a single page, as handed over by the PDF decoder.
//!
//! Coordinates follow the page's reading direction: `y` grows downward, so a
//! span near the bottom of the page has a large `y`. The decoder already
//! groups spans into visual lines and lines into geometric blocks; this
//! module only carries that structure, it never rebuilds it.

use serde::{Deserialize, Serialize};

/// A single run of text at a position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub size: f32,
    pub x: f32,
    pub y: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, size: f32, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            size,
            x,
            y,
        }
    }
}

/// One visual line: spans sharing a baseline, left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanLine {
    pub spans: Vec<TextSpan>,
}

impl SpanLine {
    pub fn new(spans: Vec<TextSpan>) -> Self {
        Self { spans }
    }

    /// Concatenated span text, trimmed.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Largest span size on the line, or `None` for a line without spans.
    pub fn dominant_size(&self) -> Option<f32> {
        self.spans.iter().map(|s| s.size).reduce(f32::max)
    }

    /// Lowest point of the line on the page (largest `y`).
    pub fn origin_y(&self) -> Option<f32> {
        self.spans.iter().map(|s| s.y).reduce(f32::max)
    }
}

/// A geometric block of lines as delimited by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanBlock {
    pub lines: Vec<SpanLine>,
}

impl SpanBlock {
    pub fn new(lines: Vec<SpanLine>) -> Self {
        Self { lines }
    }
}

/// All blocks of one page, in the decoder's block order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number in the source document.
    pub number: u32,
    pub blocks: Vec<SpanBlock>,
}

impl Page {
    pub fn new(number: u32, blocks: Vec<SpanBlock>) -> Self {
        Self { number, blocks }
    }

    /// Every span on the page in document order.
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .flat_map(|l| l.spans.iter())
    }

    /// Non-empty line texts in document order.
    pub fn line_texts(&self) -> Vec<String> {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(SpanLine::text)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_text_concatenates_and_trims() {
        let line = SpanLine::new(vec![
            TextSpan::new("  Santo, ", 11.0, 40.0, 100.0),
            TextSpan::new("santo ", 11.0, 80.0, 100.0),
        ]);
        assert_eq!(line.text(), "Santo, santo");
    }

    #[test]
    fn test_line_without_spans_has_no_size() {
        let line = SpanLine::default();
        assert_eq!(line.dominant_size(), None);
        assert_eq!(line.origin_y(), None);
        assert_eq!(line.text(), "");
    }

    #[test]
    fn test_dominant_size_is_max() {
        let line = SpanLine::new(vec![
            TextSpan::new("a", 11.0, 0.0, 100.0),
            TextSpan::new("b", 12.2, 10.0, 101.0),
        ]);
        assert_eq!(line.dominant_size(), Some(12.2));
        assert_eq!(line.origin_y(), Some(101.0));
    }

    #[test]
    fn test_page_line_texts_skips_empty() {
        let page = Page::new(
            3,
            vec![SpanBlock::new(vec![
                SpanLine::new(vec![TextSpan::new("12", 28.0, 0.0, 560.0)]),
                SpanLine::new(vec![TextSpan::new("   ", 11.0, 0.0, 100.0)]),
                SpanLine::new(vec![TextSpan::new("Cuán grande", 12.0, 0.0, 60.0)]),
            ])],
        );
        assert_eq!(page.line_texts(), vec!["12", "Cuán grande"]);
        assert_eq!(page.spans().count(), 3);
    }
}
