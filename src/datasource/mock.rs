//! Mock data source for testing without network calls.

use super::{DataSourceError, NeoSource};
use crate::domain::{Neo, OrbitalData};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock data source that serves predefined records and counts calls.
///
/// Range calls pop one queued chunk each; once the queue is drained they
/// return nothing. Single-record lookups are served from a map.
#[derive(Debug, Default)]
pub struct MockNeoSource {
    chunks: Mutex<VecDeque<Vec<Neo>>>,
    records: HashMap<String, Neo>,
    details: HashMap<String, OrbitalData>,
    fail_range_on_call: Option<usize>,
    range_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    neo_calls: AtomicUsize,
    requested_ranges: Mutex<Vec<(NaiveDate, NaiveDate)>>,
}

impl MockNeoSource {
    /// Create a new mock data source with empty data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response for the next range call.
    pub fn with_chunk(self, neos: Vec<Neo>) -> Self {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push_back(neos);
        }
        self
    }

    /// Add a record served by single-record lookups.
    pub fn with_record(mut self, neo: Neo) -> Self {
        self.records.insert(neo.id.clone(), neo);
        self
    }

    /// Attach orbital detail served by detail lookups.
    pub fn with_detail(mut self, neo_id: &str, detail: OrbitalData) -> Self {
        self.details.insert(neo_id.to_string(), detail);
        self
    }

    /// Make the n-th range call (1-based) fail with a server error.
    pub fn failing_range_on_call(mut self, call: usize) -> Self {
        self.fail_range_on_call = Some(call);
        self
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn neo_calls(&self) -> usize {
        self.neo_calls.load(Ordering::SeqCst)
    }

    pub fn requested_ranges(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.requested_ranges
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NeoSource for MockNeoSource {
    async fn fetch_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Neo>, DataSourceError> {
        let call = self.range_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut ranges) = self.requested_ranges.lock() {
            ranges.push((start, end));
        }
        if self.fail_range_on_call == Some(call) {
            return Err(DataSourceError::HttpError {
                status: 503,
                message: "Server error".to_string(),
            });
        }

        let mut chunks = self
            .chunks
            .lock()
            .map_err(|e| DataSourceError::Other(e.to_string()))?;
        Ok(chunks.pop_front().unwrap_or_default())
    }

    async fn fetch_detail(&self, neo_id: &str) -> Option<OrbitalData> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.details.get(neo_id).cloned()
    }

    async fn fetch_neo(&self, neo_id: &str) -> Result<Neo, DataSourceError> {
        self.neo_calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(neo_id)
            .cloned()
            .ok_or_else(|| DataSourceError::NotFound(neo_id.to_string()))
    }
}
