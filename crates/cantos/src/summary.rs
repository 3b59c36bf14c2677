use std::path::PathBuf;

use cantos_core::extract::{Extraction, Notice};
use colored::Colorize;

use crate::prelude::{println, *};
use crate::sink::{ClearOutcome, Delivery};

/// Everything an operator wants to know after a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub songs: usize,
    pub orphaned_blocks: usize,
    pub empty_songs: usize,
    pub numbering_warnings: usize,
    pub skipped_pages: usize,
    pub artifact: Option<PathBuf>,
    pub delivery: Option<Delivery>,
}

impl RunSummary {
    pub fn from_extraction(extraction: &Extraction, skipped_pages: usize) -> Self {
        let numbering_warnings = extraction
            .notices
            .iter()
            .filter(|n| {
                matches!(
                    n,
                    Notice::UnlabelledSong { .. }
                        | Notice::UnparsedNumeral { .. }
                        | Notice::UnparsedPageNumber { .. }
                )
            })
            .count();
        let skipped_by_parser = extraction
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::SkippedPage(_)))
            .count();

        Self {
            songs: extraction.songs.len(),
            orphaned_blocks: extraction.orphaned_blocks(),
            empty_songs: extraction.empty_songs(),
            numbering_warnings,
            skipped_pages: skipped_pages + skipped_by_parser,
            ..Default::default()
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Songs", self.songs.to_string()),
            ("Orphaned blocks", self.orphaned_blocks.to_string()),
            ("Empty songs", self.empty_songs.to_string()),
            ("Numbering warnings", self.numbering_warnings.to_string()),
            ("Skipped pages", self.skipped_pages.to_string()),
        ];

        if let Some(path) = &self.artifact {
            rows.push(("Artifact", path.display().to_string()));
        }

        if let Some(delivery) = &self.delivery {
            rows.push(("Sink", delivery.target.clone()));
            rows.push((
                "Clear",
                match &delivery.clear {
                    ClearOutcome::Skipped => "skipped".to_string(),
                    ClearOutcome::Cleared => "ok".to_string(),
                    ClearOutcome::Failed(e) => f!("failed: {e}"),
                },
            ));

            let import = &delivery.import;
            rows.push(("Imported", import.imported.to_string()));
            rows.push(("Failed", import.failed.len().to_string()));
            if !import.failed.is_empty() {
                let numbers: Vec<String> = import.failed.iter().map(u32::to_string).collect();
                rows.push(("Failed nh", numbers.join(", ")));
            }
            if let Some(message) = &import.message {
                rows.push(("Message", message.clone()));
            }
            if let Some(e) = &import.error {
                rows.push(("Error", e.to_string()));
            }
        }

        rows
    }

    pub fn print(&self) {
        let mut table = new_table();
        for (label, value) in self.rows() {
            let value = match label {
                "Failed" | "Empty songs" | "Orphaned blocks" | "Numbering warnings"
                | "Skipped pages"
                    if value != "0" =>
                {
                    value.bright_yellow()
                }
                "Error" => value.bright_red(),
                "Songs" | "Imported" => value.bright_green(),
                _ => value.bright_white(),
            };
            table.add_row(prettytable::row![label.bold().cyan(), value]);
        }

        println!();
        table.printstd();
    }
}

/// Write every notice to the log.
pub fn log_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::OrphanedBlocks { count } => {
                log::warn!("dropped {count} stanza block(s) found before the first title")
            }
            Notice::EmptySong { nh, title, page } => {
                log::warn!("song {nh} \"{title}\" (page {page}) has no stanzas")
            }
            Notice::UnlabelledSong { nh, title, page } => log::warn!(
                "song \"{title}\" (page {page}) has no footer number, using running count {nh}"
            ),
            Notice::UnparsedNumeral { nh, numeral } => {
                log::warn!("song {nh}: stanza numeral {numeral:?} does not fit a counter, kept as printed")
            }
            Notice::SkippedPage(skip) => log::warn!("skipped page: {skip:?}"),
            Notice::UnparsedPageNumber { page, text, nh } => {
                log::warn!("page {page}: {text:?} is not a song number, using {nh}")
            }
        }
    }
}
