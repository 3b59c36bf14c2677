//! Destinations for extracted songs.
//!
//! Every operation reports an outcome value instead of failing the run: the
//! local artifact is already on disk by the time a sink is contacted.

use cantos_core::song::Song;

use crate::config::SinkTarget;
use crate::prelude::*;

pub mod http;
pub mod sqlite;

/// Result of removing previously imported records.
#[derive(Debug, Clone, PartialEq)]
pub enum ClearOutcome {
    /// Clearing was turned off.
    Skipped,
    Cleared,
    Failed(Error),
}

/// Result of importing the new records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportOutcome {
    pub imported: usize,
    /// Song numbers that did not make it.
    pub failed: Vec<u32>,
    /// Message returned by the endpoint, if any.
    pub message: Option<String>,
    /// Reason for a whole-batch failure.
    pub error: Option<Error>,
}

impl ImportOutcome {
    /// Every song failed for the same reason.
    pub fn failed_all(songs: &[Song], error: Error) -> Self {
        Self {
            imported: 0,
            failed: songs.iter().map(|s| s.nh).collect(),
            message: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.error.is_none()
    }
}

/// What happened at a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub target: String,
    pub clear: ClearOutcome,
    pub import: ImportOutcome,
}

/// Clear (optionally) and import `songs` at `target`.
pub async fn deliver(target: &SinkTarget, songs: &[Song], clear: bool) -> Delivery {
    let delivery = match target {
        SinkTarget::Http {
            api_url,
            collection,
        } => {
            let sink = http::HttpSink::new(api_url, collection);
            sink.deliver(songs, clear).await
        }
        SinkTarget::Sqlite { path } => {
            let path = path.clone();
            let owned = songs.to_vec();
            match tokio::task::spawn_blocking(move || sqlite::deliver(&path, &owned, clear)).await {
                Ok(delivery) => delivery,
                Err(e) => Delivery {
                    target: describe(target),
                    clear: ClearOutcome::Skipped,
                    import: ImportOutcome::failed_all(songs, Error::Task(e.to_string())),
                },
            }
        }
    };

    if let ClearOutcome::Failed(e) = &delivery.clear {
        log::warn!("could not clear previous records at {}: {e}", delivery.target);
    }
    if let Some(e) = &delivery.import.error {
        log::error!("import into {} failed: {e}", delivery.target);
    }
    delivery
}

pub fn describe(target: &SinkTarget) -> String {
    match target {
        SinkTarget::Http { api_url, .. } => api_url.clone(),
        SinkTarget::Sqlite { path } => path.display().to_string(),
    }
}
