pub mod catalog;
pub mod health;
pub mod refresh;

use crate::db::store::{CatalogStore, RefreshMetadataStore};
use crate::orchestration::{CacheCoordinator, CatalogQueryService};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub query: Arc<CatalogQueryService>,
    pub coordinator: Arc<CacheCoordinator>,
    pub catalog: Arc<dyn CatalogStore>,
    pub metadata: Arc<dyn RefreshMetadataStore>,
}

impl AppState {
    pub fn new(
        query: Arc<CatalogQueryService>,
        coordinator: Arc<CacheCoordinator>,
        catalog: Arc<dyn CatalogStore>,
        metadata: Arc<dyn RefreshMetadataStore>,
    ) -> Self {
        Self {
            query,
            coordinator,
            catalog,
            metadata,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/neos", get(catalog::list_neos))
        .route("/v1/neos/:id", get(catalog::get_neo))
        .route("/v1/refresh", post(refresh::trigger_refresh))
        .route("/v1/refresh/status", get(refresh::refresh_status))
        .layer(cors)
        .with_state(state)
}
