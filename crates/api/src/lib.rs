//! HTTP API server with observability for the comanda order system.
//!
//! Provides REST endpoints for order creation, claiming, and lifecycle
//! transitions, with structured logging (tracing) and Prometheus
//! metrics. Callers are identified by gateway-injected headers; see
//! [`auth`].

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::OrderService;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use storage::{
    GrantDirectory, InMemoryGrantDirectory, InMemoryOrderStore, InMemoryProductCatalog, OrderStore,
    PostgresGrantDirectory, PostgresOrderStore, PostgresProductCatalog, ProductCatalog,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C, G>(
    state: Arc<AppState<S, C, G>>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: OrderStore + 'static,
    C: ProductCatalog + 'static,
    G: GrantDirectory + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S, C, G>))
        .route("/orders", get(routes::orders::list::<S, C, G>))
        .route("/orders/{id}", get(routes::orders::get::<S, C, G>))
        .route(
            "/orders/{id}/state",
            post(routes::orders::update_state::<S, C, G>),
        )
        .route("/orders/{id}/claim", post(routes::orders::claim::<S, C, G>))
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

/// In-memory application state.
pub type InMemoryAppState =
    AppState<InMemoryOrderStore, InMemoryProductCatalog, InMemoryGrantDirectory>;

/// PostgreSQL application state.
pub type PostgresAppState =
    AppState<PostgresOrderStore, PostgresProductCatalog, PostgresGrantDirectory>;

/// Creates application state over in-memory backends.
///
/// The catalog and grant directory handles are returned alongside the
/// state so callers can seed products and courier grants.
pub fn create_in_memory_state() -> (
    Arc<InMemoryAppState>,
    InMemoryProductCatalog,
    InMemoryGrantDirectory,
) {
    let catalog = InMemoryProductCatalog::new();
    let grants = InMemoryGrantDirectory::new();
    let order_service = OrderService::new(
        InMemoryOrderStore::new(),
        catalog.clone(),
        grants.clone(),
    );

    let state = Arc::new(AppState { order_service });
    (state, catalog, grants)
}

/// Creates application state over PostgreSQL backends sharing one pool.
pub fn create_postgres_state(pool: PgPool) -> Arc<PostgresAppState> {
    let order_service = OrderService::new(
        PostgresOrderStore::new(pool.clone()),
        PostgresProductCatalog::new(pool.clone()),
        PostgresGrantDirectory::new(pool),
    );

    Arc::new(AppState { order_service })
}
