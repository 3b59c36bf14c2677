//! Text extraction, line grouping, and block assembly.
//!
//! Turns a page's content-stream operators into positioned [`TextSpan`]s and
//! then into [`TextLine`]s and [`TextBlock`]s. Everything here is a pure
//! transformation; I/O lives behind the [`PdfBackend`] trait.
//!
//! # Pipeline
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  TextBlock[]
//!   (per page)      extract         group_spans     group_lines
//! ```
//!
//! Span coordinates leave this module with `y` measured from the top of the
//! page, so sorting by ascending `y` is reading order.

use std::collections::HashMap;

use super::backend::{ContentOp, FontResource, Operand, PageBox, PageId, PdfBackend};
use crate::types::{PageText, TextBlock, TextLine, TextSpan};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two spans whose Y coordinates differ by less than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate glyph width as a fraction of font size; no glyph metrics are read.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Minimum gap (in points) between adjacent spans before a space is inserted.
const MIN_WORD_GAP: f32 = 1.5;

/// A vertical gap larger than this multiple of the previous line's font size
/// starts a new block.
const BLOCK_GAP_FACTOR: f32 = 1.4;

/// Font sizes closer than this are considered the same size.
const FONT_SIZE_BUCKET: f32 = 0.5;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource key (`/F1`), not the base-font name.
    font_key: Vec<u8>,
    font_name: String,
    font_size: f32,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix; set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    /// Horizontal scaling factor (percent / 100).
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    /// Rendered size: `font_size * sqrt(b^2 + d^2)` of the text matrix.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the line matrix by a translation (Td / TD / T*).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn char_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn estimate_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width()
    }

    fn advance_after_show(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let w = self.char_width() + self.char_spacing;
                if ch == ' ' {
                    w + self.word_spacing
                } else {
                    w
                }
            })
            .sum();
        self.advance_x(dx);
    }

    fn span(&self, text: String, x: f32, y: f32) -> TextSpan {
        TextSpan {
            width: self.estimate_width(&text),
            text,
            x,
            y,
            font_size: self.effective_font_size(),
            font_name: self.font_name.clone(),
        }
    }
}

/// Everything needed while walking one page's operators.
struct Walker<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    fonts: Vec<FontResource>,
    state: TextState,
    spans: Vec<TextSpan>,
}

impl Walker<'_> {
    fn decode(&self, operand: &Operand) -> String {
        match operand {
            Operand::Str(bytes) => {
                let decoded = self
                    .backend
                    .decode_text(self.page_id, &self.state.font_key, bytes);
                if decoded.is_empty() {
                    super::backend::decode_text_simple(bytes)
                } else {
                    decoded
                }
            }
            _ => String::new(),
        }
    }

    fn apply(&mut self, op: &ContentOp) {
        let first = op.number(0);
        match op.operator.as_str() {
            "BT" => {
                self.state.text_matrix = IDENTITY_MATRIX;
                self.state.line_matrix = IDENTITY_MATRIX;
            }
            // Font state survives ET; some producers set Tf once per page.
            "ET" => {}
            "Tf" => self.set_font(&op.operands),
            "Tm" => {
                let vals: Vec<f32> = op.operands.iter().take(6).filter_map(Operand::number).collect();
                if let &[a, b, c, d, e, f] = vals.as_slice() {
                    self.state.text_matrix = [a, b, c, d, e, f];
                    self.state.line_matrix = self.state.text_matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.state.leading = -ty;
                    self.state.translate_line(tx, ty);
                }
            }
            "T*" => self.state.next_line(),
            "TL" => {
                if let Some(v) = first {
                    self.state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = first {
                    self.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = first {
                    self.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = first {
                    self.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = first {
                    self.state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    self.show(operand);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(arr)) = op.operands.first() {
                    self.show_array(arr);
                }
            }
            "'" => {
                self.state.next_line();
                if let Some(operand) = op.operands.first() {
                    self.show(operand);
                }
            }
            "\"" => {
                if let [aw, ac, operand, ..] = &op.operands[..] {
                    if let Some(aw) = aw.number() {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = ac.number() {
                        self.state.char_spacing = ac;
                    }
                    self.state.next_line();
                    self.show(operand);
                }
            }
            _ => {}
        }
    }

    fn set_font(&mut self, operands: &[Operand]) {
        let [key, size, ..] = operands else {
            return;
        };
        let key = match key {
            Operand::Name(n) | Operand::Str(n) => n.clone(),
            _ => return,
        };
        let name = self
            .fonts
            .iter()
            .find(|f| f.key == key)
            .and_then(|f| f.base_font.clone())
            .unwrap_or_else(|| String::from_utf8_lossy(&key).into_owned());

        self.state.font_key = key;
        self.state.font_name = name;
        self.state.font_size = size.number().unwrap_or(0.0);
    }

    fn show(&mut self, operand: &Operand) {
        let text = self.decode(operand);
        if text.is_empty() {
            return;
        }
        let x = self.state.x();
        let y = self.state.y() + self.state.text_rise;
        self.spans.push(self.state.span(text.clone(), x, y));
        self.state.advance_after_show(&text);
    }

    /// `TJ` arrays mix strings with kerning adjustments in thousandths of a
    /// text-space unit. Large negative adjustments are word gaps.
    fn show_array(&mut self, arr: &[Operand]) {
        let mut buf = String::new();
        let mut span_x = self.state.x();
        let span_y = self.state.y() + self.state.text_rise;

        for elem in arr {
            if let Operand::Str(_) = elem {
                let fragment = self.decode(elem);
                if buf.is_empty() {
                    span_x = self.state.x();
                }
                buf.push_str(&fragment);
                self.state.advance_after_show(&fragment);
            } else if let Some(adj) = elem.number() {
                let dx = -adj / 1000.0 * self.state.font_size * self.state.horiz_scale;
                if dx > self.state.char_width() * 0.3 && !buf.is_empty() {
                    buf.push(' ');
                }
                self.state.advance_x(dx);
            }
        }

        let text = buf.trim_end();
        if !text.is_empty() {
            self.spans.push(self.state.span(text.to_string(), span_x, span_y));
        }
    }
}

// ---------------------------------------------------------------------------
// Public API: span extraction
// ---------------------------------------------------------------------------

/// Walk a single page's content stream and produce its [`TextSpan`]s.
///
/// Handles `BT ET Tf Tm Td TD T* TL Tc Tw Tz Ts Tj TJ ' "`; every other
/// operator is ignored. The returned `y` is measured down from the top edge
/// of the MediaBox.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let ops = backend.page_ops(page_id)?;
    let page_box = backend.page_box(page_id)?;

    let mut walker = Walker {
        backend,
        page_id,
        fonts: backend.page_fonts(page_id).unwrap_or_default(),
        state: TextState::default(),
        spans: Vec::new(),
    };
    for op in &ops {
        walker.apply(op);
    }

    Ok(walker
        .spans
        .into_iter()
        .map(|mut span| {
            span.y = page_box.flip(span.y);
            span
        })
        .collect())
}

/// Decode one page (1-based) into lines and blocks.
pub fn extract_page(backend: &dyn PdfBackend, number: u32) -> Result<PageText, PdfError> {
    let page_id = *backend
        .pages()
        .get(&number)
        .ok_or(PdfError::PageOutOfRange(number))?;
    let height = backend.page_box(page_id)?.height();
    let spans = extract_page_spans(backend, page_id)?;

    Ok(PageText {
        number,
        height,
        blocks: group_lines_into_blocks(group_spans_into_lines(spans)),
    })
}

// ---------------------------------------------------------------------------
// Public API: span -> line grouping
// ---------------------------------------------------------------------------

/// Group spans into lines, top to bottom.
///
/// Spans whose Y coordinates are within [`Y_TOLERANCE`] points share a line.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let breaks = current
            .first()
            .is_some_and(|first| (span.y - first.y).abs() > Y_TOLERANCE);
        if breaks {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Build a [`TextLine`] from spans known to share the same Y.
///
/// Adjacent spans in the same font are merged. Whenever the horizontal gap
/// between two spans reaches [`MIN_WORD_GAP`], a space is kept between them
/// so the line text reads as words even when sizes differ.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.x - (prev.x + prev.width);
            let same_font = prev.font_name == span.font_name
                && (prev.font_size - span.font_size).abs() < FONT_SIZE_BUCKET;
            let spaced = gap >= MIN_WORD_GAP
                && !prev.text.ends_with(char::is_whitespace)
                && !span.text.starts_with(char::is_whitespace);

            if same_font && gap < prev.font_size * 2.0 && gap > -prev.font_size {
                if spaced {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = (span.x + span.width) - prev.x;
                continue;
            }

            if spaced {
                prev.text.push(' ');
            }
        }

        merged.push(span);
    }

    TextLine {
        y: merged.first().map(|s| s.y).unwrap_or(0.0),
        x: merged.first().map(|s| s.x).unwrap_or(0.0),
        font_size: dominant_font_size(&merged),
        spans: merged,
    }
}

/// The font size covering the most characters.
fn dominant_font_size(spans: &[TextSpan]) -> f32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for s in spans {
        let key = (s.font_size * 100.0).round() as i32;
        *counts.entry(key).or_insert(0) += s.text.chars().count();
    }
    counts
        .into_iter()
        .max_by_key(|&(k, c)| (c, k))
        .map(|(k, _)| k as f32 / 100.0)
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Public API: line -> block grouping
// ---------------------------------------------------------------------------

/// Group consecutive lines into blocks.
///
/// A new block starts when the vertical gap from the previous line exceeds
/// [`BLOCK_GAP_FACTOR`] times its font size, or when the dominant font size
/// changes.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let mut blocks: Vec<TextBlock> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        let breaks = current.last().is_some_and(|prev| {
            let gap = (line.y - prev.y).abs();
            gap > prev.font_size * BLOCK_GAP_FACTOR
                || (line.font_size - prev.font_size).abs() >= FONT_SIZE_BUCKET
        });
        if breaks {
            blocks.push(TextBlock {
                lines: std::mem::take(&mut current),
            });
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(TextBlock { lines: current });
    }

    blocks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
