use std::path::{Path, PathBuf};

use cantos_core::config::LayoutConfig;

use crate::prelude::*;

/// Command-line overrides for the layout thresholds.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LayoutArgs {
    /// Font size of the footer song number
    #[arg(long)]
    pub number_size: Option<f32>,

    /// Font size of song titles
    #[arg(long)]
    pub title_size: Option<f32>,

    /// Font size of verse text
    #[arg(long)]
    pub content_size: Option<f32>,

    /// Allowed distance from a band's size
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Lines whose origin lies below this y (top-down, points) are footer
    #[arg(long)]
    pub footer_y: Option<f32>,
}

impl LayoutArgs {
    /// Apply CLI overrides to the configuration
    pub fn apply(&self, mut config: LayoutConfig) -> LayoutConfig {
        if let Some(v) = self.number_size {
            config.number_size = v;
        }
        if let Some(v) = self.title_size {
            config.title_size = v;
        }
        if let Some(v) = self.content_size {
            config.content_size = v;
        }
        if let Some(v) = self.tolerance {
            config.tolerance = v;
        }
        if let Some(v) = self.footer_y {
            config.footer_y = v;
        }
        config
    }
}

/// Defaults, then the optional TOML file, then CLI flags.
pub fn load_layout(path: Option<&Path>, overrides: &LayoutArgs) -> Result<LayoutConfig> {
    let base = match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .wrap_err_with(|| f!("Failed to read layout config {}", path.display()))?;
            LayoutConfig::from_toml(&source)
                .wrap_err_with(|| f!("Invalid layout config {}", path.display()))?
        }
        None => LayoutConfig::default(),
    };

    let config = overrides.apply(base);
    config.validate().wrap_err("Invalid layout thresholds")?;
    log::debug!("layout config: {:?}", config);
    Ok(config)
}

/// Where extracted songs go after the artifact is written.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SinkArgs {
    /// Base URL of the import API (e.g. http://localhost:3000)
    #[arg(long, env = "CANTOS_API_URL", conflicts_with = "db")]
    pub api_url: Option<String>,

    /// SQLite database file to insert songs into
    #[arg(long, env = "CANTOS_DB")]
    pub db: Option<PathBuf>,

    /// Collection cleared before importing
    #[arg(long, env = "CANTOS_COLLECTION", default_value = "cantos")]
    pub collection: String,

    /// Keep previously imported records instead of clearing them first
    #[arg(long)]
    pub no_clear: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkTarget {
    Http { api_url: String, collection: String },
    Sqlite { path: PathBuf },
}

impl SinkArgs {
    pub fn target(&self) -> Option<SinkTarget> {
        if let Some(api_url) = &self.api_url {
            return Some(SinkTarget::Http {
                api_url: api_url.trim_end_matches('/').to_string(),
                collection: self.collection.clone(),
            });
        }
        self.db
            .as_ref()
            .map(|path| SinkTarget::Sqlite { path: path.clone() })
    }

    pub fn clear(&self) -> bool {
        !self.no_clear
    }
}
