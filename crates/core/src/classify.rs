//! Span classification: which role does each piece of text play on the page?
//!
//! The template carries no markup, so roles come from typography alone:
//!
//! | role          | rule                                                     |
//! |---------------|----------------------------------------------------------|
//! | `NumberLabel` | size in the number band and origin below the footer line |
//! | `Title`       | size in the title band                                   |
//! | `Ignored`     | anything else below the footer line, or a number-band    |
//! |               | line above it                                            |
//! | `Body`        | everything else                                          |
//!
//! Lines are classified by their dominant (largest) span size and their
//! lowest span origin.

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::page::{Page, SpanLine, TextSpan};

/// Semantic role of a span or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    NumberLabel,
    Title,
    Body,
    Ignored,
}

/// Classify a position and size pair. Shared by spans and lines so both
/// follow exactly the same rules.
pub fn classify_at(size: f32, y: f32, config: &LayoutConfig) -> Role {
    let footer = config.is_footer(y);
    if config.in_number_band(size) {
        if footer {
            Role::NumberLabel
        } else {
            Role::Ignored
        }
    } else if config.in_title_band(size) {
        Role::Title
    } else if footer {
        Role::Ignored
    } else {
        Role::Body
    }
}

pub fn classify_span(span: &TextSpan, config: &LayoutConfig) -> Role {
    classify_at(span.size, span.y, config)
}

/// A visual line after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub text: String,
    pub size: f32,
    pub y: f32,
    pub role: Role,
}

/// Classify one line. Lines without spans or without text yield `None`.
pub fn classify_line(line: &SpanLine, config: &LayoutConfig) -> Option<ClassifiedLine> {
    let size = line.dominant_size()?;
    let y = line.origin_y()?;
    let text = line.text();
    if text.is_empty() {
        return None;
    }
    Some(ClassifiedLine {
        role: classify_at(size, y, config),
        text,
        size,
        y,
    })
}

/// A page with every line tagged and the page-level labels resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedPage {
    pub number: u32,
    /// Song number printed in the footer, if one parsed on this page.
    pub number_label: Option<u32>,
    /// All title lines of the page joined with a single space.
    pub title: Option<String>,
    /// Classified lines, still grouped by geometric block.
    pub blocks: Vec<Vec<ClassifiedLine>>,
}

impl ClassifiedPage {
    pub fn has_title(&self) -> bool {
        self.title.is_some()
    }
}

/// Resolve the footer numeral of a page.
///
/// When several spans qualify, the last one in document order that parses
/// as an integer wins.
pub fn number_label(page: &Page, config: &LayoutConfig) -> Option<u32> {
    page.spans()
        .filter(|span| classify_span(span, config) == Role::NumberLabel)
        .filter_map(|span| span.text.trim().parse::<u32>().ok())
        .last()
}

/// Classify a whole page.
pub fn classify(page: &Page, config: &LayoutConfig) -> ClassifiedPage {
    let blocks: Vec<Vec<ClassifiedLine>> = page
        .blocks
        .iter()
        .map(|block| {
            block
                .lines
                .iter()
                .filter_map(|line| classify_line(line, config))
                .collect()
        })
        .collect();

    let titles: Vec<&str> = blocks
        .iter()
        .flatten()
        .filter(|line| line.role == Role::Title)
        .map(|line| line.text.as_str())
        .collect();
    let title = if titles.is_empty() {
        None
    } else {
        Some(titles.join(" "))
    };

    ClassifiedPage {
        number: page.number,
        number_label: number_label(page, config),
        title,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{SpanBlock, TextSpan};

    fn span(text: &str, size: f32, y: f32) -> TextSpan {
        TextSpan::new(text, size, 40.0, y)
    }

    fn line(text: &str, size: f32, y: f32) -> SpanLine {
        SpanLine::new(vec![span(text, size, y)])
    }

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn test_classify_at_roles() {
        let c = config();
        assert_eq!(classify_at(28.0, 560.0, &c), Role::NumberLabel);
        assert_eq!(classify_at(28.0, 100.0, &c), Role::Ignored);
        assert_eq!(classify_at(12.0, 60.0, &c), Role::Title);
        assert_eq!(classify_at(11.0, 120.0, &c), Role::Body);
        assert_eq!(classify_at(11.0, 560.0, &c), Role::Ignored);
        assert_eq!(classify_at(8.0, 560.0, &c), Role::Ignored);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        let c = config();
        assert_eq!(classify_at(13.0, 60.0, &c), Role::Body);
        assert_eq!(classify_at(12.9, 60.0, &c), Role::Title);
        assert_eq!(classify_at(27.0, 560.0, &c), Role::Ignored);
    }

    #[test]
    fn test_classify_line_uses_dominant_size() {
        let mixed = SpanLine::new(vec![span("Al ", 11.0, 80.0), span("Señor", 12.0, 80.0)]);
        let classified = classify_line(&mixed, &config()).unwrap();
        assert_eq!(classified.role, Role::Title);
        assert_eq!(classified.text, "Al Señor");
        assert_eq!(classified.size, 12.0);
    }

    #[test]
    fn test_classify_line_skips_malformed() {
        assert!(classify_line(&SpanLine::default(), &config()).is_none());
        assert!(classify_line(&line("   ", 11.0, 100.0), &config()).is_none());
    }

    #[test]
    fn test_number_label_last_parsed_candidate_wins() {
        let page = Page::new(
            9,
            vec![
                SpanBlock::new(vec![line("41", 28.0, 560.0)]),
                SpanBlock::new(vec![line("42", 28.0, 520.0)]),
                SpanBlock::new(vec![line("x", 28.0, 570.0)]),
            ],
        );
        assert_eq!(number_label(&page, &config()), Some(42));
    }

    #[test]
    fn test_number_label_ignores_spans_above_footer() {
        let page = Page::new(9, vec![SpanBlock::new(vec![line("7", 28.0, 300.0)])]);
        assert_eq!(number_label(&page, &config()), None);
    }

    #[test]
    fn test_classify_joins_titles_in_document_order() {
        let page = Page::new(
            10,
            vec![
                SpanBlock::new(vec![line("CUÁN GRANDE", 12.0, 50.0)]),
                SpanBlock::new(vec![line("ES ÉL", 12.0, 64.0), line("Señor mi Dios", 11.0, 90.0)]),
                SpanBlock::new(vec![line("3", 28.0, 560.0)]),
            ],
        );
        let classified = classify(&page, &config());
        assert_eq!(classified.title.as_deref(), Some("CUÁN GRANDE ES ÉL"));
        assert_eq!(classified.number_label, Some(3));
        assert_eq!(classified.blocks.len(), 3);
        assert_eq!(classified.blocks[1][1].role, Role::Body);
    }

    #[test]
    fn test_classify_page_without_title() {
        let page = Page::new(11, vec![SpanBlock::new(vec![line("verse", 11.0, 90.0)])]);
        let classified = classify(&page, &config());
        assert!(!classified.has_title());
        assert_eq!(classified.number_label, None);
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let c = LayoutConfig {
            title_size: 16.0,
            footer_y: 700.0,
            ..LayoutConfig::default()
        };
        assert_eq!(classify_at(12.0, 60.0, &c), Role::Body);
        assert_eq!(classify_at(16.0, 60.0, &c), Role::Title);
        assert_eq!(classify_at(11.0, 600.0, &c), Role::Body);
    }
}
