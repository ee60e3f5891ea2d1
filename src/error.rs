// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// A page request that failed for a reason other than "no more pages".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
}

/// Raised when a page does not have the shape of a results listing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no results table (`table#results-table`) in page")]
    MissingContainer,
    #[error("results table has no header row")]
    MissingHeader,
    #[error("header has {found} labels, expected {expected}")]
    HeaderWidth { expected: usize, found: usize },
    #[error("row {row} is missing the `{field}` cell")]
    MissingField { row: usize, field: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
    #[error("non-finite value {0} in finish minutes")]
    NonFinite(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid source url {url:?}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid value {value:?} for {key}")]
    Value { key: &'static str, value: String },
    #[error("reading config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
