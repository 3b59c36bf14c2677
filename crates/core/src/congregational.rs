//! The congregational section: one song per page.
//!
//! Pages in this section have no typographic cues worth classifying. The
//! first text line is the song number, the second the title, and whatever
//! follows is the content, kept as printed (no stanza renumbering).

use serde::{Deserialize, Serialize};

use crate::song::{Song, SongKind};

/// Why a page could not become a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSkip {
    /// Fewer than two text lines: no room for a number and a title.
    TooShort { page: u32, lines: usize },
}

/// A congregational song and whether its number had to be guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongregationalSong {
    pub song: Song,
    pub page: u32,
    /// The printed first line when it was not a number.
    pub unparsed_number: Option<String>,
}

/// Build a song from one page's text lines.
///
/// `fallback_nh` is used when the first line is not a number.
pub fn parse_page(
    page: u32,
    lines: &[String],
    fallback_nh: u32,
    next_id: &mut impl FnMut() -> String,
) -> Result<CongregationalSong, PageSkip> {
    let [number, title, content @ ..] = lines else {
        return Err(PageSkip::TooShort {
            page,
            lines: lines.len(),
        });
    };

    let number = number.trim();
    let (nh, unparsed_number) = match number.parse::<u32>() {
        Ok(nh) => (nh, None),
        Err(_) => (fallback_nh, Some(number.to_string())),
    };

    Ok(CongregationalSong {
        song: Song {
            id: next_id(),
            title: title.trim().to_string(),
            kind: SongKind::Congregacional,
            nh,
            content: content.join("\n"),
        },
        page,
        unparsed_number,
    })
}
