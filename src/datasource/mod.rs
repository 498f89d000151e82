//! Data source abstraction for fetching near-Earth object records.

use crate::domain::{Neo, OrbitalData};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;

pub mod mock;
pub mod nasa;

pub use mock::MockNeoSource;
pub use nasa::NasaNeoSource;

/// Upstream feed of near-Earth object records.
///
/// Implementations own transport concerns (credentials, retry, timeouts).
/// They do not rate-limit; callers keep range requests within the feed's
/// span limit instead.
#[async_trait]
pub trait NeoSource: Send + Sync + fmt::Debug {
    /// Fetch every record with a close approach between `start` and `end`
    /// (both inclusive), flattened across dates.
    ///
    /// # Returns
    /// Records in arrival order; no ordering across dates is guaranteed.
    async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Neo>, DataSourceError>;

    /// Fetch the orbital detail block for one record (best-effort).
    ///
    /// Any upstream failure yields `None`.
    async fn fetch_detail(&self, neo_id: &str) -> Option<OrbitalData>;

    /// Fetch one full record, orbital detail included.
    ///
    /// # Errors
    /// `DataSourceError::NotFound` when the upstream has no such id.
    async fn fetch_neo(&self, neo_id: &str) -> Result<Neo, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 403 bad key, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// Rate limit exceeded after retries
    RateLimited,
    /// Upstream has no record with this id
    NotFound(String),
    /// Other error
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::NotFound(id) => write!(f, "Not found upstream: {}", id),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
