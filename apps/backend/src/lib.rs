pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use review_core::{RankTable, Sm2};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, DueLimits};
use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub scheduler: Arc<Sm2>,
    pub ranks: Arc<RankTable>,
    pub due_limits: DueLimits,
}

impl AppState {
    /// State with the default scheduler and rank ladder.
    pub fn new(store: Store, due_limits: DueLimits) -> Self {
        Self {
            store: Arc::new(store),
            scheduler: Arc::new(Sm2::default()),
            ranks: Arc::new(RankTable::default()),
            due_limits,
        }
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/reviews", post(routes::reviews::submit))
        .route("/api/reviews/due", get(routes::reviews::due))
        .route("/api/reviews/stats", get(routes::reviews::stats))
        .route(
            "/api/vocabulary/{id}/review",
            post(routes::reviews::submit_for_item),
        )
        .route("/api/rank", get(routes::rank::get))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store = Store::open(&config).await?;
    tracing::info!("Using {} store", store.backend_name());

    let app = build_router(AppState::new(store, config.due_limits));

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
