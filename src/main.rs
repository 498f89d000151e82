use neo_catalog::db::store::{CatalogStore, OwnershipLookup, RefreshMetadataStore};
use neo_catalog::{
    api, config::Config, db::init_db, CacheCoordinator, CatalogQueryService, NasaNeoSource,
    NeoSource, RefreshScheduler, Repository,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;

    // Initialize database and dependencies
    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let source: Arc<dyn NeoSource> = match NasaNeoSource::new(
        config.neo_api_url.clone(),
        config.neo_api_key.clone(),
        config.http_timeout,
    ) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            eprintln!("Failed to build upstream client: {}", e);
            std::process::exit(1);
        }
    };

    let repo = Arc::new(Repository::new(pool));
    let catalog: Arc<dyn CatalogStore> = repo.clone();
    let metadata: Arc<dyn RefreshMetadataStore> = repo.clone();
    let owners: Arc<dyn OwnershipLookup> = repo;

    let coordinator = Arc::new(CacheCoordinator::new(
        source,
        catalog.clone(),
        metadata.clone(),
        config.refresh,
    ));
    let query = Arc::new(CatalogQueryService::new(
        catalog.clone(),
        owners,
        coordinator.clone(),
    ));

    RefreshScheduler::new(coordinator.clone(), catalog.clone(), config.refresh_interval).spawn();

    // Create router
    let app = api::create_router(api::AppState::new(query, coordinator, catalog, metadata));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
