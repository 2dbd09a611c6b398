use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RinthError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Background fetch failed: {0}")]
    Task(String),

    /// An error delivered to more than one coalesced caller.
    #[error("{0}")]
    Shared(Arc<RinthError>),
}

impl RinthError {
    /// Unwrap an error coming out of a shared in-flight fetch.
    pub fn from_shared(err: Arc<RinthError>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(RinthError::Shared)
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RinthError::Status { status, .. } => Some(*status),
            RinthError::Http(e) => e.status().map(|s| s.as_u16()),
            RinthError::Shared(inner) => inner.status(),
            _ => None,
        }
    }
}
