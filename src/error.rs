// src/error.rs
//! Error taxonomy: fetch and parse failures are recovered by the fallback chain,
//! only `AllSourcesFailed` and `LookupError` reach the HTTP layer.

use std::fmt;
use thiserror::Error;

use crate::ingest::types::SourceTag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("upstream returned HTTP {0}")]
    HttpStatus(u16),

    /// Malformed URL or host not on the allow-list; no request was sent.
    #[error("url rejected: {0}")]
    Rejected(String),

    #[error("fetch failed: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else {
            FetchError::Unknown(e.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("no matches found")]
    NoMatchesFound,

    /// Structural selectors matched nothing; upstream markup probably changed.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Why one source/mirror attempt was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Fetch(FetchError),
    Parse(ParseError),
    Empty,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Fetch(e) => write!(f, "fetch: {e}"),
            AttemptFailure::Parse(e) => write!(f, "parse: {e}"),
            AttemptFailure::Empty => f.write_str("zero records"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub source: SourceTag,
    pub url: String,
    pub failure: AttemptFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all {} source attempts failed", .attempts.len())]
pub struct AllSourcesFailed {
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("match not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] AllSourcesFailed),
}
