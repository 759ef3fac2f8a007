use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a processing run.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error reading CSV file {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Error writing results CSV {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A request that never produced a response (connect failure, timeout, broken body).
#[derive(Error, Debug)]
#[error("Request error: {0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError(err.to_string())
    }
}
