pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod error;
pub mod orchestration;
pub mod pricing;

pub use config::Config;
pub use datasource::{DataSourceError, MockNeoSource, NasaNeoSource, NeoSource};
pub use db::{init_db, CatalogStore, OwnershipLookup, RefreshMetadataStore, Repository, StoreError};
pub use domain::{CatalogEntry, CatalogItem, FilterSpec, Neo, PageRequest, PagedResult, SortBy};
pub use error::AppError;
pub use orchestration::{CacheCoordinator, CatalogError, CatalogQueryService, RefreshScheduler};
