//! Keeps the local catalog in step with the upstream feed.
//!
//! A refresh cycle walks the configured window in feed-sized chunks, then
//! enriches, prices and upserts every record with bounded concurrency. A
//! failed range fetch aborts the cycle before anything is written; a failed
//! item upsert is counted and skipped. Cycles are serialized through a lease
//! row so overlapping triggers are rejected rather than interleaved. The
//! running cycle renews its lease every third of the TTL and stops as soon
//! as a renewal shows another holder took it over.

use crate::config::RefreshConfig;
use crate::datasource::{DataSourceError, NeoSource};
use crate::db::store::{CatalogStore, RefreshMetadataStore, StoreError};
use crate::domain::{
    CatalogItem, Neo, RefreshMetadata, RefreshOutcome, TimeMs, CATALOG_REFRESH_KEY,
};
use crate::pricing;
use chrono::{DateTime, Days, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("upstream error: {0}")]
    Upstream(DataSourceError),
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("a catalog refresh is already running")]
    RefreshInProgress,
    #[error("refresh lease was taken over by another cycle")]
    LeaseLost,
}

impl From<DataSourceError> for CatalogError {
    fn from(err: DataSourceError) -> Self {
        match err {
            DataSourceError::NotFound(id) => CatalogError::NotFound(id),
            other => CatalogError::Upstream(other),
        }
    }
}

#[derive(Clone)]
pub struct CacheCoordinator {
    source: Arc<dyn NeoSource>,
    catalog: Arc<dyn CatalogStore>,
    metadata: Arc<dyn RefreshMetadataStore>,
    config: RefreshConfig,
}

impl CacheCoordinator {
    pub fn new(
        source: Arc<dyn NeoSource>,
        catalog: Arc<dyn CatalogStore>,
        metadata: Arc<dyn RefreshMetadataStore>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            source,
            catalog,
            metadata,
            config,
        }
    }

    /// Run one full refresh cycle.
    ///
    /// # Errors
    /// `RefreshInProgress` if another cycle holds the lease; `LeaseLost` if
    /// the lease was taken over mid-cycle, in which case the cycle is dropped
    /// and metadata is left to the new holder. Otherwise the error that
    /// aborted the cycle, after metadata has been marked failed.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CatalogError> {
        let holder = Uuid::new_v4().to_string();
        let ttl_ms = i64::try_from(self.config.lease_ttl.as_millis()).unwrap_or(i64::MAX);

        let acquired = self
            .metadata
            .try_acquire_lease(CATALOG_REFRESH_KEY, &holder, TimeMs::now(), ttl_ms)
            .await?;
        if !acquired {
            info!("Refresh requested while another cycle holds the lease");
            return Err(CatalogError::RefreshInProgress);
        }

        let result = self.run_with_heartbeat(&holder, ttl_ms).await;

        if let Err(e) = self
            .metadata
            .release_lease(CATALOG_REFRESH_KEY, &holder)
            .await
        {
            warn!(error = %e, "Failed to release refresh lease; it will expire");
        }

        result
    }

    /// Drive the cycle while renewing the lease in the background.
    async fn run_with_heartbeat(
        &self,
        holder: &str,
        ttl_ms: i64,
    ) -> Result<RefreshOutcome, CatalogError> {
        let period = (self.config.lease_ttl / 3).max(Duration::from_millis(1));
        let mut heartbeat = tokio::time::interval(period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        heartbeat.tick().await;

        let cycle = self.run_cycle();
        tokio::pin!(cycle);

        loop {
            tokio::select! {
                result = &mut cycle => return result,
                _ = heartbeat.tick() => {
                    match self
                        .metadata
                        .renew_lease(CATALOG_REFRESH_KEY, holder, TimeMs::now(), ttl_ms)
                        .await
                    {
                        Ok(true) => debug!(holder = %holder, "Refresh lease renewed"),
                        Ok(false) => {
                            warn!(holder = %holder, "Refresh lease lost; abandoning cycle");
                            return Err(CatalogError::LeaseLost);
                        }
                        Err(e) => warn!(error = %e, "Failed to renew refresh lease"),
                    }
                }
            }
        }
    }

    async fn run_cycle(&self) -> Result<RefreshOutcome, CatalogError> {
        let started = TimeMs::now();
        info!("Starting catalog refresh");

        let previous_count = match self.metadata.get_metadata(CATALOG_REFRESH_KEY).await {
            Ok(existing) => existing.map(|m| m.record_count).unwrap_or(0),
            Err(e) => {
                self.mark_failed(0, &e.to_string()).await;
                return Err(e.into());
            }
        };

        let attempt = match self
            .metadata
            .put_metadata(
                CATALOG_REFRESH_KEY,
                &RefreshMetadata::in_progress(started, previous_count),
            )
            .await
        {
            Ok(()) => self.fetch_and_ingest().await,
            Err(e) => Err(e.into()),
        };

        match attempt {
            Ok(tally) => {
                let record_count = i64::try_from(tally.upserted).unwrap_or(i64::MAX);
                self.metadata
                    .put_metadata(
                        CATALOG_REFRESH_KEY,
                        &RefreshMetadata::succeeded(TimeMs::now(), record_count, tally.errors),
                    )
                    .await?;

                info!(
                    upserted = tally.upserted,
                    errors = tally.errors,
                    elapsed_ms = TimeMs::now().as_ms() - started.as_ms(),
                    "Catalog refresh finished"
                );
                Ok(RefreshOutcome {
                    success: true,
                    count: tally.upserted,
                    errors: tally.errors,
                })
            }
            Err(e) => {
                error!(error = %e, "Catalog refresh failed");
                self.mark_failed(previous_count, &e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn mark_failed(&self, record_count: i64, message: &str) {
        let failed = RefreshMetadata::failed(TimeMs::now(), record_count, message.to_string());
        if let Err(e) = self.metadata.put_metadata(CATALOG_REFRESH_KEY, &failed).await {
            error!(error = %e, "Failed to record refresh failure");
        }
    }

    async fn fetch_and_ingest(&self) -> Result<IngestTally, CatalogError> {
        let today = Utc::now().date_naive();
        let mut neos = Vec::new();

        for (start, end) in date_chunks(today, self.config.window_days, self.config.chunk_days) {
            let batch = self.source.fetch_range(start, end).await?;
            debug!("Fetched {} records for {}..={}", batch.len(), start, end);
            neos.extend(batch);
        }

        let neos = dedup_by_id(neos);
        info!(records = neos.len(), "Feed window fetched; enriching");

        let now = Utc::now();
        let results: Vec<Result<(), StoreError>> = stream::iter(neos)
            .map(|neo| self.ingest_one(neo, now))
            .buffer_unordered(self.config.enrich_concurrency.max(1))
            .collect()
            .await;

        let errors = results.iter().filter(|r| r.is_err()).count();
        Ok(IngestTally {
            upserted: results.len() - errors,
            errors,
        })
    }

    async fn ingest_one(&self, mut neo: Neo, now: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(detail) = self.source.fetch_detail(&neo.id).await {
            neo.orbital_data = Some(detail);
        }

        let valuation = pricing::appraise(&neo, now);
        let item = CatalogItem::from_neo(neo, valuation);

        self.catalog.upsert_item(&item).await.map_err(|e| {
            warn!(neo_id = %item.id, error = %e, "Upsert failed; skipping record");
            e
        })
    }

    /// Serve an item from the store, fetching and caching it on a miss.
    ///
    /// # Errors
    /// `NotFound` when the upstream has no such id; upstream and store
    /// failures propagate.
    pub async fn get_or_fetch(&self, neo_id: &str) -> Result<CatalogItem, CatalogError> {
        if let Some(item) = self.catalog.get_item(neo_id).await? {
            return Ok(item);
        }

        info!(neo_id = %neo_id, "Cache miss; fetching from upstream");
        let neo = self.source.fetch_neo(neo_id).await?;
        let valuation = pricing::appraise(&neo, Utc::now());
        let item = CatalogItem::from_neo(neo, valuation);
        self.catalog.upsert_item(&item).await?;

        Ok(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IngestTally {
    upserted: usize,
    errors: usize,
}

/// Split `[start, start + window_days)` into consecutive inclusive ranges
/// of at most `chunk_days` days, clipping the last one to the window.
pub fn date_chunks(start: NaiveDate, window_days: u32, chunk_days: u32) -> Vec<(NaiveDate, NaiveDate)> {
    let chunk_days = chunk_days.max(1);
    let mut chunks = Vec::new();
    let mut offset = 0u32;

    while offset < window_days {
        let len = chunk_days.min(window_days - offset);
        let (Some(first), Some(last)) = (
            start.checked_add_days(Days::new(u64::from(offset))),
            start.checked_add_days(Days::new(u64::from(offset + len - 1))),
        ) else {
            break;
        };
        chunks.push((first, last));
        offset += len;
    }

    chunks
}

/// A record can appear under several dates; keep its first occurrence.
fn dedup_by_id(neos: Vec<Neo>) -> Vec<Neo> {
    let mut seen = HashSet::new();
    neos.into_iter()
        .filter(|neo| seen.insert(neo.id.clone()))
        .collect()
}
