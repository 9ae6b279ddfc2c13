use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TriageError>;

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("prompt template '{0}' not found")]
    MissingPrompt(String),

    #[error("email index {index} out of range (inbox has {len} emails)")]
    EmailIndexOutOfRange { index: usize, len: usize },

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("could not parse message: {0}")]
    Parse(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
