//! Song segmentation across pages.
//!
//! A song opens on every page that carries a title and stays open through the
//! following untitled pages. The segmenter is a pure state transition so the
//! caller can fold pages through it in strict document order:
//!
//! ```text
//! (state, page) -> (state, Option<RawSong>)
//! ```

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, StanzaBlock};
use crate::classify::ClassifiedPage;

/// A completed song before numbering and identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSong {
    pub nh: u32,
    /// `true` when `nh` came from a printed footer numeral rather than the
    /// running count.
    pub labelled: bool,
    pub title: String,
    pub stanzas: Vec<StanzaBlock>,
    /// Page on which the title was found.
    pub first_page: u32,
    pub last_page: u32,
}

/// The song currently collecting stanzas.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Accumulator {
    title: String,
    label: Option<u32>,
    /// Running-count fallback fixed when the song was opened.
    ordinal: u32,
    stanzas: Vec<StanzaBlock>,
    first_page: u32,
    last_page: u32,
}

impl Accumulator {
    fn close(self) -> RawSong {
        RawSong {
            nh: self.label.unwrap_or(self.ordinal),
            labelled: self.label.is_some(),
            title: self.title,
            stanzas: self.stanzas,
            first_page: self.first_page,
            last_page: self.last_page,
        }
    }
}

/// Segmenter state threaded through the page fold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmenter {
    open: Option<Accumulator>,
    emitted: u32,
    orphaned_blocks: usize,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stanza blocks seen before the first title; they belong to no song.
    pub fn orphaned_blocks(&self) -> usize {
        self.orphaned_blocks
    }

    /// Feed one classified page. Returns the song closed by this page's
    /// title, if any.
    pub fn step(mut self, page: &ClassifiedPage) -> (Self, Option<RawSong>) {
        let mut completed = None;

        if let Some(title) = &page.title {
            if let Some(previous) = self.open.take() {
                completed = Some(previous.close());
                self.emitted += 1;
            }
            self.open = Some(Accumulator {
                title: title.clone(),
                label: page.number_label,
                ordinal: self.emitted + 1,
                stanzas: Vec::new(),
                first_page: page.number,
                last_page: page.number,
            });
        }

        let stanzas = aggregate(page);
        match self.open.as_mut() {
            Some(song) => {
                if song.label.is_none() {
                    song.label = page.number_label;
                }
                song.last_page = page.number;
                song.stanzas.extend(stanzas);
            }
            None => self.orphaned_blocks += stanzas.len(),
        }

        (self, completed)
    }

    /// Close the open song at end of input.
    pub fn finish(mut self) -> (Self, Option<RawSong>) {
        let last = self.open.take().map(Accumulator::close);
        if last.is_some() {
            self.emitted += 1;
        }
        (self, last)
    }
}

/// Outcome of segmenting a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub songs: Vec<RawSong>,
    pub orphaned_blocks: usize,
}

/// Fold every page through a fresh [`Segmenter`].
pub fn segment<'a, I>(pages: I) -> Segmentation
where
    I: IntoIterator<Item = &'a ClassifiedPage>,
{
    let mut songs = Vec::new();
    let state = pages.into_iter().fold(Segmenter::new(), |state, page| {
        let (state, completed) = state.step(page);
        songs.extend(completed);
        state
    });
    let (state, last) = state.finish();
    songs.extend(last);

    Segmentation {
        songs,
        orphaned_blocks: state.orphaned_blocks(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifiedLine, Role};

    fn body(text: &str) -> ClassifiedLine {
        ClassifiedLine {
            text: text.to_string(),
            size: 11.0,
            y: 100.0,
            role: Role::Body,
        }
    }

    fn page(
        number: u32,
        title: Option<&str>,
        label: Option<u32>,
        stanzas: &[&[&str]],
    ) -> ClassifiedPage {
        ClassifiedPage {
            number,
            number_label: label,
            title: title.map(str::to_string),
            blocks: stanzas
                .iter()
                .map(|lines| lines.iter().map(|l| body(l)).collect())
                .collect(),
        }
    }

    #[test]
    fn test_single_page_song() {
        let pages = vec![page(7, Some("SANTO"), Some(1), &[&["Santo, santo"], &["CORO", "Santo"]])];
        let result = segment(&pages);
        assert_eq!(result.songs.len(), 1);
        let song = &result.songs[0];
        assert_eq!(song.nh, 1);
        assert!(song.labelled);
        assert_eq!(song.title, "SANTO");
        assert_eq!(song.stanzas.len(), 2);
        assert_eq!((song.first_page, song.last_page), (7, 7));
    }

    #[test]
    fn test_continuation_page_appends_and_supplies_label() {
        let pages = vec![
            page(7, Some("ROCA DE LA ETERNIDAD"), None, &[&["Roca de la eternidad"]]),
            page(8, None, Some(12), &[&["Mientras haya de vivir"]]),
        ];
        let result = segment(&pages);
        assert_eq!(result.songs.len(), 1);
        let song = &result.songs[0];
        assert_eq!(song.nh, 12);
        assert!(song.labelled);
        assert_eq!(
            song.stanzas,
            vec![
                StanzaBlock::new(["Roca de la eternidad"]),
                StanzaBlock::new(["Mientras haya de vivir"]),
            ]
        );
        assert_eq!(song.last_page, 8);
    }

    #[test]
    fn test_title_page_label_is_not_overwritten_by_continuation() {
        let pages = vec![
            page(7, Some("A"), Some(5), &[&["uno"]]),
            page(8, None, Some(6), &[&["dos"]]),
        ];
        assert_eq!(segment(&pages).songs[0].nh, 5);
    }

    #[test]
    fn test_new_title_closes_previous_song() {
        let pages = vec![
            page(7, Some("A"), Some(1), &[&["a1"]]),
            page(8, None, None, &[&["a2"]]),
            page(9, Some("B"), Some(2), &[&["b1"]]),
        ];
        let result = segment(&pages);
        let titles: Vec<&str> = result.songs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert_eq!(result.songs[0].stanzas.len(), 2);
        assert_eq!(result.songs[1].stanzas.len(), 1);
    }

    #[test]
    fn test_missing_labels_fall_back_to_running_count() {
        let pages = vec![
            page(7, Some("A"), None, &[&["a"]]),
            page(8, Some("B"), Some(40), &[&["b"]]),
            page(9, Some("C"), None, &[&["c"]]),
        ];
        let nhs: Vec<(u32, bool)> = segment(&pages)
            .songs
            .iter()
            .map(|s| (s.nh, s.labelled))
            .collect();
        assert_eq!(nhs, vec![(1, false), (40, true), (3, false)]);
    }

    #[test]
    fn test_content_before_first_title_is_orphaned() {
        let pages = vec![
            page(6, None, None, &[&["prólogo"], &["índice"]]),
            page(7, Some("A"), None, &[&["a"]]),
        ];
        let result = segment(&pages);
        assert_eq!(result.orphaned_blocks, 2);
        assert_eq!(result.songs.len(), 1);
        assert_eq!(result.songs[0].stanzas, vec![StanzaBlock::new(["a"])]);
    }

    #[test]
    fn test_consecutive_title_pages_emit_empty_song() {
        let pages = vec![
            page(7, Some("A"), Some(1), &[]),
            page(8, Some("B"), Some(2), &[&["b"]]),
        ];
        let result = segment(&pages);
        assert_eq!(result.songs.len(), 2);
        assert!(result.songs[0].stanzas.is_empty());
        assert_eq!(result.songs[0].title, "A");
        assert_eq!(result.songs[1].stanzas.len(), 1);
    }

    #[test]
    fn test_step_and_finish_state_transitions() {
        let state = Segmenter::new();
        let (state, done) = state.step(&page(7, Some("A"), None, &[&["a"]]));
        assert!(done.is_none());

        let (state, done) = state.step(&page(8, Some("B"), None, &[&["b"]]));
        assert_eq!(done.map(|s| s.title), Some("A".to_string()));

        let (state, last) = state.finish();
        assert_eq!(last.map(|s| s.nh), Some(2));

        let (_, again) = state.finish();
        assert!(again.is_none());
    }

    #[test]
    fn test_no_pages() {
        let pages: Vec<ClassifiedPage> = Vec::new();
        let result = segment(&pages);
        assert!(result.songs.is_empty());
        assert_eq!(result.orphaned_blocks, 0);
    }

    #[test]
    fn test_every_block_assigned_exactly_once() {
        let pages = vec![
            page(7, Some("A"), None, &[&["a1"], &["a2"]]),
            page(8, None, None, &[&["a3"]]),
            page(9, Some("B"), None, &[&["b1"]]),
            page(10, None, None, &[&["b2"], &["b3"]]),
        ];
        let result = segment(&pages);
        let assigned: Vec<String> = result
            .songs
            .iter()
            .flat_map(|s| s.stanzas.iter().map(StanzaBlock::text))
            .collect();
        assert_eq!(assigned, vec!["a1", "a2", "a3", "b1", "b2", "b3"]);
    }
}
