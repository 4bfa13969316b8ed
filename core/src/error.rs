use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClickerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed progress snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Game session is closed")]
    SessionClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ClickerResult<T> = Result<T, ClickerError>;
