/// Why a sink operation did not go through. Carried inside outcome values so
/// a failed delivery never aborts a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}
