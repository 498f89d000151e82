//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and schema bootstrap
//! - SQLite pragma configuration
//! - Store traits and the SQLite-backed repository implementing them

pub mod migrations;
pub mod repo;
pub mod store;

pub use migrations::init_db;
pub use repo::Repository;
pub use store::{CatalogStore, OwnershipLookup, RefreshMetadataStore, StoreError};
