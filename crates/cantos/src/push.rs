use std::path::{Path, PathBuf};

use cantos_core::song::{from_artifact, Song};
use colored::Colorize;

use crate::config::SinkArgs;
use crate::prelude::{println, *};
use crate::summary::RunSummary;

#[derive(Debug, clap::Parser)]
#[command(name = "push")]
#[command(about = "Forward an existing JSON artifact to a sink")]
pub struct App {
    /// Artifact written by `cantos extract`
    #[arg(env = "CANTOS_OUTPUT", default_value = "cantos.json")]
    pub artifact: PathBuf,

    #[clap(flatten)]
    pub sink: SinkArgs,
}

pub fn read_artifact(path: &Path) -> Result<Vec<Song>> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("Failed to read artifact {}", path.display()))?;
    from_artifact(&json).wrap_err_with(|| f!("Malformed artifact {}", path.display()))
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let target = app
        .sink
        .target()
        .ok_or_eyre("Nothing to push to: pass --api-url or --db")?;

    let songs = read_artifact(&app.artifact)?;
    if global.verbose {
        println!("Read {} song(s) from {}", songs.len(), app.artifact.display());
    }

    let delivery = crate::sink::deliver(&target, &songs, app.sink.clear()).await;

    let summary = RunSummary {
        songs: songs.len(),
        artifact: Some(app.artifact.clone()),
        delivery: Some(delivery),
        ..Default::default()
    };

    println!(
        "\nPushed {} to {}",
        app.artifact.display().to_string().bold(),
        crate::sink::describe(&target)
    );
    summary.print();

    Ok(())
}
