// src/error.rs
use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// One document could not be fetched after all retries. The run moves on.
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Cache store I/O. Fatal: without the cache the run is not resumable.
    #[error("Store error at {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cache file {} is not valid JSON: {message}", path.display())]
    CacheFormat { path: PathBuf, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure of one call against a remote lookup service.
/// "Not found" is not an error; capabilities return `Ok(None)` / empty for that.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("service error: {0}")]
    Service(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LookupError::Timeout
        } else if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else {
            LookupError::Service(err.to_string())
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub fn store(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Store { path: path.into(), source }
    }
}
