//! Refresh orchestration and the catalog read path.

pub mod coordinator;
pub mod query;
pub mod scheduler;

pub use coordinator::{date_chunks, CacheCoordinator, CatalogError};
pub use query::CatalogQueryService;
pub use scheduler::RefreshScheduler;
