//! Domain types for the NEO catalog.
//!
//! This module provides:
//! - Raw feed records (`Neo` and its nested blocks)
//! - Materialized catalog items with derived price and size
//! - Filter, sort and paging vocabulary for the read path
//! - Refresh bookkeeping types

pub mod catalog;
pub mod filter;
pub mod neo;
pub mod paging;
pub mod primitives;
pub mod refresh;

pub use catalog::{CatalogEntry, CatalogItem, Owner, Valuation};
pub use filter::{CatalogPredicate, FilterSpec, HazardFilter, SortBy};
pub use neo::{
    closest_approach_km, CloseApproach, DiameterRange, EstimatedDiameter, MissDistance, Neo,
    OrbitClass, OrbitalData, RelativeVelocity,
};
pub use paging::{PageRequest, PagedResult};
pub use primitives::TimeMs;
pub use refresh::{RefreshMetadata, RefreshOutcome, RefreshStatus, CATALOG_REFRESH_KEY};
