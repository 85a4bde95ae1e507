use crate::cli::ServeArgs;
use crate::infra::{
    seed_demo_data, AppState, InMemoryListingRepository, InMemoryOrderStore, InMemoryUserDirectory,
};
use crate::routes::marketplace_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use homeshare::accounts::SessionService;
use homeshare::billing::{BillingService, PackageCatalog};
use homeshare::config::AppConfig;
use homeshare::error::AppError;
use homeshare::listings::ListingService;
use homeshare::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let directory = Arc::new(InMemoryUserDirectory::default());
    let listing_store = Arc::new(InMemoryListingRepository::default());
    let order_store = Arc::new(InMemoryOrderStore::default());
    if config.marketplace.seed_demo_data {
        seed_demo_data(&directory, &listing_store, &order_store);
        info!("demo accounts, listings, and orders seeded");
    }

    let sessions = Arc::new(SessionService::new(
        directory.clone(),
        config.marketplace.session_ttl_minutes,
    ));
    let listings = Arc::new(ListingService::new(listing_store.clone(), directory.clone()));
    let billing = Arc::new(BillingService::new(
        order_store.clone(),
        directory.clone(),
        PackageCatalog::standard(),
    ));

    let app = marketplace_router(
        listings,
        billing,
        sessions,
        directory,
        listing_store,
        order_store,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "homeshare marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
