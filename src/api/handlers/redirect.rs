//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short id to its stored URL.
///
/// # Endpoint
///
/// `GET /{id}`
///
/// Always answers with **307 Temporary Redirect**, so clients re-resolve
/// after the entry is deleted.
///
/// # Errors
///
/// Returns 404 Not Found if the id doesn't exist.
/// Returns 400 Bad Request if the id is malformed.
pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.entry_service.get_entry(&id).await?;
    debug!(id = %entry.id, "Redirecting to {}", entry.url);

    Ok(Redirect::temporary(&entry.url))
}
