//! End-to-end extraction over pages already decoded into positioned text.
//!
//! ```text
//! Page -> classify -> ClassifiedPage -> segment -> RawSong -> finalize -> Song
//! ```
//!
//! Pages must arrive in document order. Nothing here does I/O; identifiers
//! come from the caller-supplied generator.

use crate::classify::{classify, ClassifiedPage};
use crate::config::LayoutConfig;
use crate::congregational::{parse_page, PageSkip};
use crate::page::Page;
use crate::segment::segment;
use crate::song::{finalize, Song, SongKind};
use crate::stanza::StanzaMarker;

/// Something the operator should hear about. None of these stop a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Stanza blocks found before the first title were dropped.
    OrphanedBlocks { count: usize },
    /// A song closed without any stanza.
    EmptySong { nh: u32, title: String, page: u32 },
    /// No footer numeral anywhere in the song; `nh` is the running count.
    UnlabelledSong { nh: u32, title: String, page: u32 },
    /// A stanza numeral matched the digit pattern but did not parse.
    UnparsedNumeral { nh: u32, numeral: String },
    /// A congregational page did not yield a song.
    SkippedPage(PageSkip),
    /// A congregational page's first line was not a number.
    UnparsedPageNumber { page: u32, text: String, nh: u32 },
}

/// Songs in emission order plus everything worth reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub songs: Vec<Song>,
    pub notices: Vec<Notice>,
}

impl Extraction {
    pub fn empty_songs(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| matches!(n, Notice::EmptySong { .. }))
            .count()
    }

    pub fn orphaned_blocks(&self) -> usize {
        self.notices
            .iter()
            .map(|n| match n {
                Notice::OrphanedBlocks { count } => *count,
                _ => 0,
            })
            .sum()
    }
}

/// Layout-driven extraction of `Canto` records.
pub fn extract_cantos<I>(
    pages: I,
    config: &LayoutConfig,
    next_id: &mut impl FnMut() -> String,
) -> Extraction
where
    I: IntoIterator<Item = Page>,
{
    let classified: Vec<ClassifiedPage> =
        pages.into_iter().map(|page| classify(&page, config)).collect();
    let segmentation = segment(&classified);

    let mut extraction = Extraction::default();
    if segmentation.orphaned_blocks > 0 {
        extraction.notices.push(Notice::OrphanedBlocks {
            count: segmentation.orphaned_blocks,
        });
    }

    for raw in segmentation.songs {
        let extracted = finalize(raw, SongKind::Canto, next_id);
        let song = &extracted.song;
        if extracted.is_empty() {
            extraction.notices.push(Notice::EmptySong {
                nh: song.nh,
                title: song.title.clone(),
                page: extracted.first_page,
            });
        }
        if !extracted.labelled {
            extraction.notices.push(Notice::UnlabelledSong {
                nh: song.nh,
                title: song.title.clone(),
                page: extracted.first_page,
            });
        }
        for marker in &extracted.markers {
            if let StanzaMarker::Unparsed(numeral) = marker {
                extraction.notices.push(Notice::UnparsedNumeral {
                    nh: song.nh,
                    numeral: numeral.clone(),
                });
            }
        }
        extraction.songs.push(extracted.song);
    }

    extraction
}

/// One-song-per-page extraction of `Congregacional` records.
pub fn extract_congregational<I>(pages: I, next_id: &mut impl FnMut() -> String) -> Extraction
where
    I: IntoIterator<Item = Page>,
{
    let mut extraction = Extraction::default();
    for page in pages {
        let fallback = extraction.songs.len() as u32 + 1;
        match parse_page(page.number, &page.line_texts(), fallback, next_id) {
            Ok(parsed) => {
                if let Some(text) = parsed.unparsed_number {
                    extraction.notices.push(Notice::UnparsedPageNumber {
                        page: parsed.page,
                        text,
                        nh: parsed.song.nh,
                    });
                }
                extraction.songs.push(parsed.song);
            }
            Err(skip) => extraction.notices.push(Notice::SkippedPage(skip)),
        }
    }
    extraction
}
