#![allow(unused)]

use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod extract;
mod inspect;
mod prelude;
mod push;
mod sink;
mod source;
mod summary;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Turn a typeset hymnal PDF into song records and ship them to an API or a SQLite file"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// TOML file with layout thresholds (font-size bands, tolerance, footer line)
    #[clap(long, env = "CANTOS_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "CANTOS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Extract songs from the PDF into a JSON artifact, optionally forwarding them to a sink
    Extract(crate::extract::App),

    /// Forward an existing JSON artifact to a sink
    Push(crate::push::App),

    /// Show how the classifier sees a single page
    Inspect(crate::inspect::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let app = App::parse();

    match app.command {
        SubCommands::Extract(sub_app) => crate::extract::run(sub_app, app.global).await,
        SubCommands::Push(sub_app) => crate::push::run(sub_app, app.global).await,
        SubCommands::Inspect(sub_app) => crate::inspect::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
