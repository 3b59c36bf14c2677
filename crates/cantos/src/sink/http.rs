use std::time::Duration;

use cantos_core::song::Song;
use serde::Deserialize;

use super::{ClearOutcome, Delivery, ImportOutcome};
use crate::prelude::*;

const CLEAR_TIMEOUT: Duration = Duration::from_secs(10);
const IMPORT_TIMEOUT: Duration = Duration::from_secs(30);

/// Optional fields the import endpoint may answer with.
#[derive(Debug, Default, Deserialize)]
struct ImportResponse {
    message: Option<String>,
    count: Option<usize>,
}

/// Import API reached over HTTP.
pub struct HttpSink {
    client: reqwest::Client,
    api_url: String,
    collection: String,
}

impl HttpSink {
    pub fn new(api_url: &str, collection: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        }
    }

    /// `DELETE {api_url}/api/{collection}`. Best effort.
    pub async fn clear(&self) -> ClearOutcome {
        let url = f!("{}/api/{}", self.api_url, self.collection);
        log::info!("clearing {url}");

        let response = match self
            .client
            .delete(&url)
            .timeout(CLEAR_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ClearOutcome::Failed(e.into()),
        };

        match check_status(response).await {
            Ok(_) => ClearOutcome::Cleared,
            Err(e) => ClearOutcome::Failed(e),
        }
    }

    /// `POST {api_url}/import` with the whole list as a JSON array.
    pub async fn import(&self, songs: &[Song]) -> ImportOutcome {
        let url = f!("{}/import", self.api_url);
        log::info!("importing {} song(s) into {url}", songs.len());

        let response = match self
            .client
            .post(&url)
            .timeout(IMPORT_TIMEOUT)
            .json(songs)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ImportOutcome::failed_all(songs, e.into()),
        };

        let body = match check_status(response).await {
            Ok(body) => body,
            Err(e) => return ImportOutcome::failed_all(songs, e),
        };

        // Any 2xx is a success; the body is informational.
        let reply: ImportResponse = serde_json::from_str(&body).unwrap_or_default();
        ImportOutcome {
            imported: reply.count.unwrap_or(songs.len()),
            failed: Vec::new(),
            message: reply.message,
            error: None,
        }
    }

    pub async fn deliver(&self, songs: &[Song], clear: bool) -> Delivery {
        let clear = if clear {
            self.clear().await
        } else {
            ClearOutcome::Skipped
        };
        Delivery {
            target: self.api_url.clone(),
            clear,
            import: self.import(songs).await,
        }
    }
}

async fn check_status(response: reqwest::Response) -> std::result::Result<String, Error> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(Error::Status {
            status: status.as_u16(),
            body,
        })
    }
}
