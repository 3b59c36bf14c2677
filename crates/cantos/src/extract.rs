use std::path::{Path, PathBuf};

use cantos_core::config::PageRange;
use cantos_core::extract::{extract_cantos, extract_congregational, Extraction};
use cantos_core::page::Page;
use cantos_core::song::{to_artifact, Song};
use colored::Colorize;

use crate::config::{load_layout, LayoutArgs, SinkArgs};
use crate::prelude::{println, *};
use crate::summary::{log_notices, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Titles found by font size; songs may span pages
    #[default]
    Cantos,
    /// One song per page: number, title, then verses
    Congregational,
}

impl Mode {
    /// Page window read when neither `--start-page` nor `--end-page` is given.
    pub fn default_range(self) -> PageRange {
        match self {
            Mode::Cantos => PageRange::default(),
            Mode::Congregational => PageRange {
                start: 6,
                end: Some(161),
            },
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(name = "extract")]
#[command(about = "Extract songs from the PDF into a JSON artifact")]
pub struct App {
    /// Path to the hymnal PDF
    #[arg(env = "CANTOS_PDF")]
    pub pdf: PathBuf,

    /// Where to write the JSON artifact
    #[arg(short, long, env = "CANTOS_OUTPUT", default_value = "cantos.json")]
    pub output: PathBuf,

    /// Which section layout to read. Pages 7 to the end by default for
    /// `cantos`, pages 6 to 161 for `congregational`
    #[arg(long, value_enum, default_value_t = Mode::Cantos)]
    pub mode: Mode,

    /// First page to read (1-based); earlier pages are front matter
    #[arg(long, env = "CANTOS_START_PAGE")]
    pub start_page: Option<u32>,

    /// Last page to read (inclusive); without it the end of the document
    #[arg(long, env = "CANTOS_END_PAGE")]
    pub end_page: Option<u32>,

    #[clap(flatten)]
    pub layout: LayoutArgs,

    #[clap(flatten)]
    pub sink: SinkArgs,
}

impl App {
    /// Any explicit page flag drops the mode's default end page; a missing
    /// start page still takes the mode's default start.
    pub fn page_range(&self) -> Result<PageRange> {
        Ok(match (self.start_page, self.end_page) {
            (None, None) => self.mode.default_range(),
            (start, end) => PageRange::new(start.unwrap_or(self.mode.default_range().start), end)?,
        })
    }
}

/// Run the pure pipeline over decoded pages. Identifiers are random UUIDv4.
pub fn extract_pages(
    pages: Vec<Page>,
    mode: Mode,
    layout: &cantos_core::config::LayoutConfig,
) -> Extraction {
    let mut next_id = || uuid::Uuid::new_v4().to_string();
    match mode {
        Mode::Cantos => extract_cantos(pages, layout, &mut next_id),
        Mode::Congregational => extract_congregational(pages, &mut next_id),
    }
}

/// Write the pretty-printed artifact in one go.
pub fn write_artifact(path: &Path, songs: &[Song]) -> Result<()> {
    let json = to_artifact(songs).wrap_err("Failed to serialize songs")?;
    std::fs::write(path, json)
        .wrap_err_with(|| f!("Failed to write artifact {}", path.display()))?;
    log::info!("wrote {} song(s) to {}", songs.len(), path.display());
    Ok(())
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let layout = load_layout(global.config.as_deref(), &app.layout)?;
    let range = app.page_range()?;

    let doc = crate::source::open(&app.pdf)?;
    let document = crate::source::describe_document(&doc.metadata());
    log::info!("opened {}: {}", app.pdf.display(), document);

    if global.verbose {
        println!("PDF: {} [{}]", app.pdf.display(), document);
        println!("Mode: {:?}", app.mode);
        println!("Pages: {:?}", range);
        println!("Layout: {:?}", layout);
        println!();
    }

    let source = crate::source::read_pages(&doc, &range)?;
    let extraction = extract_pages(source.pages, app.mode, &layout);
    log_notices(&extraction.notices);

    write_artifact(&app.output, &extraction.songs)?;

    let mut summary = RunSummary::from_extraction(&extraction, source.skipped.len());
    summary.artifact = Some(app.output.clone());

    if let Some(target) = app.sink.target() {
        summary.delivery =
            Some(crate::sink::deliver(&target, &extraction.songs, app.sink.clear()).await);
    }

    println!(
        "\nExtracted {} song(s) from {}",
        extraction.songs.len().to_string().bold(),
        app.pdf.display()
    );
    summary.print();

    Ok(())
}
