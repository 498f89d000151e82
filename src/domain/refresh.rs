//! Refresh bookkeeping for the catalog as a whole.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::primitives::TimeMs;

/// Logical name of the single catalog-wide metadata row and lease.
pub const CATALOG_REFRESH_KEY: &str = "neo_catalog";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Success,
    Failed,
    InProgress,
}

impl RefreshStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshStatus::Success => "success",
            RefreshStatus::Failed => "failed",
            RefreshStatus::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefreshStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(RefreshStatus::Success),
            "failed" => Ok(RefreshStatus::Failed),
            "in_progress" => Ok(RefreshStatus::InProgress),
            other => Err(format!("unknown refresh status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshMetadata {
    pub last_updated: TimeMs,
    pub status: RefreshStatus,
    pub record_count: i64,
    pub error_message: Option<String>,
}

impl RefreshMetadata {
    pub fn in_progress(now: TimeMs, previous_count: i64) -> Self {
        Self {
            last_updated: now,
            status: RefreshStatus::InProgress,
            record_count: previous_count,
            error_message: None,
        }
    }

    pub fn succeeded(now: TimeMs, record_count: i64, errors: usize) -> Self {
        Self {
            last_updated: now,
            status: RefreshStatus::Success,
            record_count,
            error_message: (errors > 0).then(|| format!("{} errors occurred", errors)),
        }
    }

    pub fn failed(now: TimeMs, record_count: i64, message: String) -> Self {
        Self {
            last_updated: now,
            status: RefreshStatus::Failed,
            record_count,
            error_message: Some(message),
        }
    }
}

/// Result reported to whoever triggered a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    pub success: bool,
    pub count: usize,
    pub errors: usize,
}
