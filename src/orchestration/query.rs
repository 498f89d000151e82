//! Read path: filtered, sorted, paginated catalog views with ownership.
//!
//! Filtering runs in two phases. The store answers the predicate it can
//! express (hazard, size, price, orbit class); distance bounds and all
//! sorting are applied here because the closest-approach distance is a
//! minimum over each item's approach list.

use crate::db::store::{CatalogStore, OwnershipLookup, StoreError};
use crate::domain::{
    CatalogEntry, CatalogItem, CatalogPredicate, FilterSpec, PageRequest, PagedResult, SortBy,
};
use crate::orchestration::coordinator::{CacheCoordinator, CatalogError};
use futures::future::try_join_all;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct CatalogQueryService {
    catalog: Arc<dyn CatalogStore>,
    owners: Arc<dyn OwnershipLookup>,
    coordinator: Arc<CacheCoordinator>,
}

impl CatalogQueryService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        owners: Arc<dyn OwnershipLookup>,
        coordinator: Arc<CacheCoordinator>,
    ) -> Self {
        Self {
            catalog,
            owners,
            coordinator,
        }
    }

    /// One page of the catalog under `filters`.
    ///
    /// `total_count` counts items after every filter, distance included.
    /// An empty catalog is populated synchronously first.
    pub async fn list(
        &self,
        page: PageRequest,
        filters: &FilterSpec,
    ) -> Result<PagedResult<CatalogEntry>, CatalogError> {
        filters.validate().map_err(CatalogError::Validation)?;

        if self.catalog.count_items().await? == 0 {
            info!("Catalog is empty; populating before serving");
            match self.coordinator.refresh().await {
                Ok(outcome) => info!(
                    count = outcome.count,
                    errors = outcome.errors,
                    "Cold-start refresh complete"
                ),
                Err(CatalogError::RefreshInProgress) => {
                    warn!("Cold-start refresh already running; serving current contents")
                }
                Err(e) => return Err(e),
            }
        }

        let predicate = CatalogPredicate::from(filters);
        let mut items = self.catalog.query_items(&predicate).await?;
        let store_count = items.len();

        if filters.has_distance_bounds() {
            items.retain(|item| filters.distance_matches(item.closest_approach_km()));
        }
        if let Some(sort_by) = filters.sort_by {
            sort_items(&mut items, sort_by);
        }
        debug!(
            store_count,
            filtered_count = items.len(),
            "Catalog query resolved"
        );

        let mut paged = PagedResult::from_ordered(items, page);
        let page_items = std::mem::take(&mut paged.items);
        let entries = self.attach_owners(page_items).await?;
        Ok(paged.with_items(entries))
    }

    /// One item with its owner, fetched upstream on a cache miss.
    pub async fn get_by_id(&self, neo_id: &str) -> Result<CatalogEntry, CatalogError> {
        let neo_id = neo_id.trim();
        if neo_id.is_empty() {
            return Err(CatalogError::Validation("id must not be empty".to_string()));
        }

        let item = self.coordinator.get_or_fetch(neo_id).await?;
        let owner = self.owners.find_owner_of(&item.id).await?;
        Ok(CatalogEntry { item, owner })
    }

    async fn attach_owners(
        &self,
        items: Vec<CatalogItem>,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let lookups = items.into_iter().map(|item| async move {
            let owner = self.owners.find_owner_of(&item.id).await?;
            Ok::<_, StoreError>(CatalogEntry { item, owner })
        });
        try_join_all(lookups).await
    }
}

/// Stable in-memory sort; ties keep store order.
///
/// Distance keys are computed once per item, since each one parses the
/// item's whole approach list.
pub fn sort_items(items: &mut Vec<CatalogItem>, sort_by: SortBy) {
    match sort_by {
        SortBy::SizeAsc => items.sort_by(|a, b| a.size.total_cmp(&b.size)),
        SortBy::SizeDesc => items.sort_by(|a, b| b.size.total_cmp(&a.size)),
        SortBy::PriceAsc => items.sort_by(|a, b| a.price.cmp(&b.price)),
        SortBy::PriceDesc => items.sort_by(|a, b| b.price.cmp(&a.price)),
        SortBy::DistanceAsc => sort_by_distance(items, |a, b| a.total_cmp(&b)),
        SortBy::DistanceDesc => sort_by_distance(items, |a, b| b.total_cmp(&a)),
    }
}

fn sort_by_distance(items: &mut Vec<CatalogItem>, compare: fn(f64, f64) -> Ordering) {
    let mut keyed: Vec<(f64, CatalogItem)> = items
        .drain(..)
        .map(|item| (item.closest_approach_km(), item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| compare(*a, *b));
    items.extend(keyed.into_iter().map(|(_, item)| item));
}
