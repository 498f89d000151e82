//! Periodic refresh driver.

use crate::db::store::CatalogStore;
use crate::orchestration::coordinator::{CacheCoordinator, CatalogError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Refreshes the catalog at startup when it is empty, then on a fixed period.
pub struct RefreshScheduler {
    coordinator: Arc<CacheCoordinator>,
    catalog: Arc<dyn CatalogStore>,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(
        coordinator: Arc<CacheCoordinator>,
        catalog: Arc<dyn CatalogStore>,
        period: Duration,
    ) -> Self {
        Self {
            coordinator,
            catalog,
            period,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        self.populate_if_empty().await;

        info!(
            "Starting refresh scheduler (every {} seconds)",
            self.period.as_secs()
        );
        let mut ticker = tokio::time::interval(self.period);
        ticker.tick().await; // Skip the first immediate tick

        loop {
            ticker.tick().await;
            self.refresh_once("scheduled").await;
        }
    }

    /// Run a refresh only if the catalog holds no items. Returns whether a
    /// refresh was attempted.
    pub async fn populate_if_empty(&self) -> bool {
        match self.catalog.count_items().await {
            Ok(0) => {
                self.refresh_once("startup").await;
                true
            }
            Ok(count) => {
                info!(count, "Catalog already populated; skipping startup refresh");
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not count catalog items; skipping startup refresh");
                false
            }
        }
    }

    async fn refresh_once(&self, trigger: &str) {
        match self.coordinator.refresh().await {
            Ok(outcome) => info!(
                trigger,
                count = outcome.count,
                errors = outcome.errors,
                "Refresh completed"
            ),
            Err(CatalogError::RefreshInProgress) => {
                info!(trigger, "Refresh skipped; another cycle is running")
            }
            Err(e) => error!(trigger, error = %e, "Refresh failed"),
        }
    }
}
