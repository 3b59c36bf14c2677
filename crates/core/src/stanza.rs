//! Stanza numbering.
//!
//! The hymnal is inconsistent: some verses carry their number on a line of
//! their own, most do not. Every song is renumbered independently, starting
//! at 1:
//!
//! - a first line that is only digits is an explicit number; the block is kept
//!   and numbering continues after it,
//! - `CORO...` opens a refrain, and `AL CORO` / `FINAL` / `FIN` mark a
//!   transition; both are kept verbatim and do not count,
//! - anything else gets the next number on a line of its own.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::aggregate::StanzaBlock;

static NUMERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("numeral pattern is valid"));

const REFRAIN: &str = "CORO";
const TRANSITIONS: [&str; 3] = ["AL CORO", "FINAL", "FIN"];

/// What a stanza's first line says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StanzaKind {
    /// Already numbered. `None` when the numeral did not fit a `u32`.
    ///
    /// The pattern matches any Unicode decimal digit but only ASCII digits
    /// parse, so `"٣"` lands here as `None` rather than `Some(3)`.
    Numbered(Option<u32>),
    Refrain,
    Transition,
    Unnumbered,
}

/// Classify a stanza by its (trimmed) first line.
///
/// Non-ASCII digit runs (Arabic-Indic, Devanagari, ...) count as numbered but
/// are never given a value; see [`StanzaMarker::Unparsed`].
pub fn classify_stanza(first_line: &str) -> StanzaKind {
    let head = first_line.trim();
    if NUMERAL.is_match(head) {
        return StanzaKind::Numbered(head.parse().ok());
    }

    let upper = head.to_uppercase();
    if upper.starts_with(REFRAIN) {
        StanzaKind::Refrain
    } else if TRANSITIONS.contains(&upper.as_str()) {
        StanzaKind::Transition
    } else {
        StanzaKind::Unnumbered
    }
}

/// The number a stanza ended up with, as recorded for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StanzaMarker {
    /// Number inserted in front of an unnumbered stanza.
    Inserted(u32),
    /// Number the stanza already carried.
    Kept(u32),
    /// Refrain, kept verbatim.
    Refrain,
    /// Transition marker, kept verbatim.
    Transition,
    /// Looked like a numeral but did not parse; kept verbatim, counter untouched.
    /// Covers overflowing ASCII numerals and every non-ASCII digit run.
    Unparsed(String),
}

impl StanzaMarker {
    /// The visible number of the stanza, if it has one.
    pub fn number(&self) -> Option<u32> {
        match self {
            StanzaMarker::Inserted(n) | StanzaMarker::Kept(n) => Some(*n),
            _ => None,
        }
    }
}

/// Renumber the stanzas of one song.
///
/// Returns the rewritten blocks and one marker per block. Only the first line
/// of a block is ever touched, and only by inserting a numeral before it.
pub fn number_stanzas(stanzas: &[StanzaBlock]) -> (Vec<StanzaBlock>, Vec<StanzaMarker>) {
    let mut next: u32 = 1;
    let mut blocks = Vec::with_capacity(stanzas.len());
    let mut markers = Vec::with_capacity(stanzas.len());

    for stanza in stanzas {
        if stanza.lines.is_empty() {
            continue;
        }

        let marker = match classify_stanza(stanza.head()) {
            StanzaKind::Numbered(Some(n)) => {
                next = n.saturating_add(1);
                StanzaMarker::Kept(n)
            }
            StanzaKind::Numbered(None) => StanzaMarker::Unparsed(stanza.head().to_string()),
            StanzaKind::Refrain => StanzaMarker::Refrain,
            StanzaKind::Transition => StanzaMarker::Transition,
            StanzaKind::Unnumbered => {
                let n = next;
                next = next.saturating_add(1);
                StanzaMarker::Inserted(n)
            }
        };

        let block = match &marker {
            StanzaMarker::Inserted(n) => {
                let mut lines = Vec::with_capacity(stanza.lines.len() + 1);
                lines.push(n.to_string());
                lines.extend(stanza.lines.iter().cloned());
                StanzaBlock { lines }
            }
            _ => stanza.clone(),
        };

        blocks.push(block);
        markers.push(marker);
    }

    (blocks, markers)
}

/// Join blocks into the content blob stored with a song.
pub fn render_content(blocks: &[StanzaBlock]) -> String {
    blocks
        .iter()
        .map(StanzaBlock::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered content of a song plus the markers that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalized {
    pub content: String,
    pub markers: Vec<StanzaMarker>,
}

impl Normalized {
    /// Numerals that matched the digit pattern but could not be parsed.
    pub fn unparsed(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().filter_map(|m| match m {
            StanzaMarker::Unparsed(raw) => Some(raw.as_str()),
            _ => None,
        })
    }
}

pub fn normalize(stanzas: &[StanzaBlock]) -> Normalized {
    let (blocks, markers) = number_stanzas(stanzas);
    Normalized {
        content: render_content(&blocks),
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(text: &str) -> StanzaBlock {
        StanzaBlock::new(text.split('\n'))
    }

    fn numbers(markers: &[StanzaMarker]) -> Vec<Option<u32>> {
        markers.iter().map(StanzaMarker::number).collect()
    }

    #[test]
    fn test_classify_stanza_kinds() {
        assert_eq!(classify_stanza("3"), StanzaKind::Numbered(Some(3)));
        assert_eq!(classify_stanza("  12 "), StanzaKind::Numbered(Some(12)));
        assert_eq!(classify_stanza("CORO"), StanzaKind::Refrain);
        assert_eq!(classify_stanza("Coro:"), StanzaKind::Refrain);
        assert_eq!(classify_stanza("coro final"), StanzaKind::Refrain);
        assert_eq!(classify_stanza("Al coro"), StanzaKind::Transition);
        assert_eq!(classify_stanza("FINAL"), StanzaKind::Transition);
        assert_eq!(classify_stanza("fin"), StanzaKind::Transition);
        assert_eq!(classify_stanza("Final de la jornada"), StanzaKind::Unnumbered);
        assert_eq!(classify_stanza("3 veces"), StanzaKind::Unnumbered);
        assert_eq!(classify_stanza(""), StanzaKind::Unnumbered);
    }

    #[test]
    fn test_classify_stanza_unparseable_numeral() {
        // Matches \d+ (Unicode digits) but is not an ASCII integer.
        assert_eq!(classify_stanza("٣"), StanzaKind::Numbered(None));
        assert_eq!(
            classify_stanza("99999999999999999999"),
            StanzaKind::Numbered(None)
        );
    }

    #[test]
    fn test_unnumbered_blocks_get_one_to_n() {
        let stanzas = vec![block("a"), block("b"), block("c")];
        let (blocks, markers) = number_stanzas(&stanzas);
        assert_eq!(numbers(&markers), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(blocks[0].lines, vec!["1", "a"]);
        assert_eq!(blocks[2].lines, vec!["3", "c"]);
    }

    #[test]
    fn test_explicit_number_resets_counter() {
        let stanzas = vec![block("a"), block("5\nb"), block("c"), block("d")];
        let (_, markers) = number_stanzas(&stanzas);
        assert_eq!(
            markers,
            vec![
                StanzaMarker::Inserted(1),
                StanzaMarker::Kept(5),
                StanzaMarker::Inserted(6),
                StanzaMarker::Inserted(7),
            ]
        );
    }

    #[test]
    fn test_refrain_does_not_advance_counter() {
        let stanzas = vec![block("a"), block("CORO\nGloria"), block("b")];
        let (blocks, markers) = number_stanzas(&stanzas);
        assert_eq!(
            markers,
            vec![
                StanzaMarker::Inserted(1),
                StanzaMarker::Refrain,
                StanzaMarker::Inserted(2),
            ]
        );
        assert_eq!(blocks[1], stanzas[1]);
    }

    #[test]
    fn test_transition_does_not_advance_counter() {
        let stanzas = vec![block("a"), block("AL CORO"), block("b"), block("Fin")];
        let (_, markers) = number_stanzas(&stanzas);
        assert_eq!(
            markers,
            vec![
                StanzaMarker::Inserted(1),
                StanzaMarker::Transition,
                StanzaMarker::Inserted(2),
                StanzaMarker::Transition,
            ]
        );
    }

    #[test]
    fn test_unparsed_numeral_leaves_counter() {
        let stanzas = vec![block("a"), block("٣\nb"), block("c")];
        let normalized = normalize(&stanzas);
        assert_eq!(
            normalized.markers,
            vec![
                StanzaMarker::Inserted(1),
                StanzaMarker::Unparsed("٣".to_string()),
                StanzaMarker::Inserted(2),
            ]
        );
        assert_eq!(normalized.unparsed().collect::<Vec<_>>(), vec!["٣"]);
    }

    #[test]
    fn test_numbering_is_idempotent() {
        let stanzas = vec![
            block("a"),
            block("4\nb"),
            block("CORO\nc"),
            block("d"),
            block("FINAL\ne"),
        ];
        let (once, _) = number_stanzas(&stanzas);
        let (twice, markers) = number_stanzas(&once);
        assert_eq!(once, twice);
        assert!(markers
            .iter()
            .all(|m| !matches!(m, StanzaMarker::Inserted(_))));
    }

    #[test]
    fn test_stripping_prefixes_recovers_input_blocks() {
        let stanzas = vec![block("a\na2"), block("2\nb"), block("Coro\nc"), block("d")];
        let (blocks, markers) = number_stanzas(&stanzas);
        let recovered: Vec<StanzaBlock> = blocks
            .into_iter()
            .zip(&markers)
            .map(|(b, m)| match m {
                StanzaMarker::Inserted(_) => StanzaBlock {
                    lines: b.lines[1..].to_vec(),
                },
                _ => b,
            })
            .collect();
        assert_eq!(recovered, stanzas);
    }

    #[test]
    fn test_render_content_joins_blocks_and_lines() {
        let normalized = normalize(&[block("Cuán grande es Él\nmi Dios"), block("CORO\nMi corazón")]);
        assert_eq!(
            normalized.content,
            "1\nCuán grande es Él\nmi Dios\nCORO\nMi corazón"
        );
    }

    #[test]
    fn test_counter_is_per_call() {
        let first = normalize(&[block("a"), block("b")]);
        let second = normalize(&[block("c")]);
        assert_eq!(numbers(&first.markers), vec![Some(1), Some(2)]);
        assert_eq!(numbers(&second.markers), vec![Some(1)]);
    }

    #[test]
    fn test_empty_song_has_empty_content() {
        let normalized = normalize(&[]);
        assert_eq!(normalized.content, "");
        assert!(normalized.markers.is_empty());
    }
}
