//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET    /`          - Index page
//! - `POST   /`          - Store a URL
//! - `GET    /{id}`      - Redirect to the stored URL
//! - `GET    /health`    - Health check: storage and broadcast
//! - `/api/*`            - JSON lookup, deletion and the live feed
//! - `/static/*`         - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{create_entry_handler, health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `static_dir` - directory served under `/static`
/// - `index_file` - page served at `GET /`
pub fn app_router(state: AppState, static_dir: &str, index_file: &str) -> NormalizePath<Router> {
    let router = Router::new()
        .route(
            "/",
            post(create_entry_handler).get_service(ServeFile::new(index_file)),
        )
        .route("/health", get(health_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
