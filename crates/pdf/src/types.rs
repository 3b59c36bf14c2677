use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single run of text at a specific position on the page.
///
/// `y` grows downward from the top edge of the page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
    pub font_name: String,
}

/// Spans sharing (approximately) the same baseline, left to right.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    pub x: f32,
    /// Size covering the most characters on the line.
    pub font_size: f32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Consecutive lines with no vertical break between them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// Positioned text of one page, top to bottom.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    pub height: f32,
    pub blocks: Vec<TextBlock>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub page_count: u32,
}

impl DocumentMetadata {
    /// Blank Info entries count as missing.
    pub fn from_info(info: &BTreeMap<String, String>, page_count: u32) -> Self {
        let entry = |key: &str| {
            info.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            title: entry("Title"),
            author: entry("Author"),
            page_count,
        }
    }
}
