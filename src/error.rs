//! Error types for the notice board pipeline.
//!
//! None of these are fatal to an aggregation run: a [`FetchError`] or a
//! [`FailureReason`] only ever removes one city from the results. The
//! table and settings errors are the ones the binary bails out on.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single endpoint could not be turned into a JSON payload.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("malformed json payload: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e)
        }
    }
}

/// Why a city is missing from an aggregation's notice map.
#[derive(Debug, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("feed contained no notices")]
    NoNotices,

    #[error("overall deadline exceeded")]
    DeadlineExceeded,

    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("cannot read endpoint table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
