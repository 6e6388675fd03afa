use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub mod accountant;
pub mod allocator;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub config: config::AppConfig,
    /// When the server started; reported as uptime by /healthz.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: sqlx::SqlitePool, config: config::AppConfig) -> Self {
        Self {
            db,
            config,
            started_at: Instant::now(),
        }
    }
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route(
            "/links",
            post(handlers::api::create_link).get(handlers::api::list_links),
        )
        .route(
            "/links/:code",
            get(handlers::api::get_link).delete(handlers::api::delete_link),
        );

    Router::new()
        .route("/", get(handlers::pages::dashboard))
        .route("/healthz", get(handlers::health::healthz))
        .route("/code/:code", get(handlers::pages::stats))
        .route("/links", post(handlers::forms::create_link))
        .route("/links/:code/delete", post(handlers::forms::delete_link))
        .nest("/api", api_router)
        // Short-link redirect; static routes above take priority
        .route("/:code", get(handlers::redirect::redirect))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
