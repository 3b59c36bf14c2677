//! Song records and the JSON artifact.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::RawSong;
use crate::stanza::{normalize, StanzaMarker};

/// Which extraction pipeline produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SongKind {
    /// Layout-driven extraction: titles by font size, songs spanning pages.
    Canto,
    /// One song per page: number, title, then verses.
    Congregacional,
}

impl fmt::Display for SongKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongKind::Canto => write!(f, "Canto"),
            SongKind::Congregacional => write!(f, "Congregacional"),
        }
    }
}

/// A persisted hymn record. Field names match the import endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SongKind,
    pub nh: u32,
    pub content: String,
}

/// A song ready for emission together with what was learned while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub song: Song,
    pub first_page: u32,
    pub labelled: bool,
    pub markers: Vec<StanzaMarker>,
}

impl Extracted {
    pub fn is_empty(&self) -> bool {
        self.song.content.is_empty()
    }
}

/// Number the stanzas of a segmented song and give it an identifier.
///
/// Identifiers come from `next_id` so the caller decides how they are
/// generated; they are never derived from content.
pub fn finalize(raw: RawSong, kind: SongKind, next_id: &mut impl FnMut() -> String) -> Extracted {
    let normalized = normalize(&raw.stanzas);
    Extracted {
        song: Song {
            id: next_id(),
            title: raw.title,
            kind,
            nh: raw.nh,
            content: normalized.content,
        },
        first_page: raw.first_page,
        labelled: raw.labelled,
        markers: normalized.markers,
    }
}

/// Serialize songs as the pretty-printed JSON artifact.
pub fn to_artifact(songs: &[Song]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(songs)
}

/// Read songs back from an artifact.
pub fn from_artifact(json: &str) -> Result<Vec<Song>, serde_json::Error> {
    serde_json::from_str(json)
}
