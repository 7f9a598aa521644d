//! HTTP API server for the order capture service.
//!
//! Provides REST endpoints for the catalog, order ingestion and sales
//! analytics, a server-sent event stream announcing sales changes, and a
//! demo seeding endpoint, with structured logging (tracing) and Prometheus
//! metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use analytics::AnalyticsService;
use axum::Router;
use axum::routing::{get, post};
use domain::{CatalogService, ChangeNotifier, DemoSeeder, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub orders: OrderService<S>,
    pub catalog: CatalogService<S>,
    pub analytics: AnalyticsService<S>,
    pub seeder: DemoSeeder<S>,
    pub notifier: ChangeNotifier,
    /// Longest quiet period on the sales stream before an event is sent anyway.
    pub heartbeat: Duration,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/api/health", get(routes::health::check))
        .route(
            "/api/productos",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route("/api/pedidos", post(routes::orders::create::<S>))
        .route("/api/ventas-top", get(routes::sales::top::<S>))
        .route("/api/ventas-serie", get(routes::sales::series::<S>))
        .route("/api/ventas-resumen", get(routes::sales::summary::<S>))
        .route("/api/ventas-sse", get(routes::events::stream::<S>))
        .route("/api/events", get(routes::events::stream::<S>))
        .route("/events", get(routes::events::stream::<S>))
        .route(
            "/api/seed",
            post(routes::seed::run::<S>).get(routes::seed::run::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over a store, wiring one notifier into
/// every writer and the event stream.
pub fn create_default_state<S: Store + Clone + 'static>(
    store: S,
    heartbeat: Duration,
) -> Arc<AppState<S>> {
    let notifier = ChangeNotifier::new();

    Arc::new(AppState {
        orders: OrderService::new(store.clone(), notifier.clone()),
        catalog: CatalogService::new(store.clone()),
        analytics: AnalyticsService::new(store.clone()),
        seeder: DemoSeeder::new(store, notifier.clone()),
        notifier,
        heartbeat,
    })
}
