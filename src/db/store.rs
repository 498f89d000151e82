//! Data-access ports for the catalog, its refresh bookkeeping, and the
//! ownership read model.
//!
//! [`crate::db::Repository`] implements all three over SQLite. The
//! coordinator and query service depend only on these traits so tests can
//! wrap or replace the backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CatalogItem, CatalogPredicate, Owner, RefreshMetadata, TimeMs};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Materialized catalog keyed by the upstream id.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or wholesale-overwrite the item with this natural key.
    async fn upsert_item(&self, item: &CatalogItem) -> Result<(), StoreError>;

    async fn get_item(&self, id: &str) -> Result<Option<CatalogItem>, StoreError>;

    async fn count_items(&self) -> Result<i64, StoreError>;

    /// All items matching the predicate, in first-ingestion order.
    async fn query_items(
        &self,
        predicate: &CatalogPredicate,
    ) -> Result<Vec<CatalogItem>, StoreError>;
}

/// Catalog-wide refresh status plus the lease that serializes refreshes.
#[async_trait]
pub trait RefreshMetadataStore: Send + Sync {
    async fn get_metadata(&self, key: &str) -> Result<Option<RefreshMetadata>, StoreError>;

    /// Create or overwrite the metadata row for `key`.
    async fn put_metadata(&self, key: &str, metadata: &RefreshMetadata)
        -> Result<(), StoreError>;

    /// Take the lease for `key` if it is free or expired.
    ///
    /// Returns `false` when another holder owns an unexpired lease.
    async fn try_acquire_lease(
        &self,
        key: &str,
        holder: &str,
        now: TimeMs,
        ttl_ms: i64,
    ) -> Result<bool, StoreError>;

    /// Push the expiry of `holder`'s lease to `now + ttl_ms`.
    ///
    /// Returns `false` when the lease is gone or belongs to someone else.
    async fn renew_lease(
        &self,
        key: &str,
        holder: &str,
        now: TimeMs,
        ttl_ms: i64,
    ) -> Result<bool, StoreError>;

    /// Drop the lease if `holder` still owns it.
    async fn release_lease(&self, key: &str, holder: &str) -> Result<(), StoreError>;
}

/// Read-only view of who owns which catalog item.
#[async_trait]
pub trait OwnershipLookup: Send + Sync {
    async fn find_owner_of(&self, neo_id: &str) -> Result<Option<Owner>, StoreError>;
}
