//! Handler for entry creation.

use axum::{Json, extract::State};
use tracing::info;
use validator::Validate;

use crate::api::dto::entry::{EntryRequest, EntryResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Stores a URL and returns its short id.
///
/// # Endpoint
///
/// `POST /`
///
/// # Request Body
///
/// ```json
/// { "url": "example.com/some/page" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": "aZ3kQ9", "url": "https://example.com/some/page" }
/// ```
///
/// Submitting a URL that is already stored returns the existing entry.
/// Either way the entry is pushed to every live watcher.
///
/// # Errors
///
/// - **400 Bad Request**: empty or invalid URL
/// - **503 Service Unavailable**: storage backend unreachable
pub async fn create_entry_handler(
    State(state): State<AppState>,
    Json(payload): Json<EntryRequest>,
) -> Result<Json<EntryResponse>, AppError> {
    payload.validate()?;

    let entry = state.entry_service.create_entry(&payload.url).await?;
    info!(id = %entry.id, url = %entry.url, "Entry stored");

    Ok(Json(entry.into()))
}
