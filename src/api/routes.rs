//! API route configuration.

use crate::api::handlers::{delete_entry_handler, get_entry_handler, watch_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// JSON API routes, nested under `/api`.
///
/// # Endpoints
///
/// - `GET    /watch` - Server-Sent Events feed of new entries
/// - `GET    /{id}`  - Entry lookup
/// - `DELETE /{id}`  - Entry deletion
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/watch", get(watch_handler))
        .route("/{id}", get(get_entry_handler).delete(delete_entry_handler))
}
