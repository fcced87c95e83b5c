//! Handler for entry lookup.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::entry::EntryResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the entry stored under a short id.
///
/// # Endpoint
///
/// `GET /api/{id}`
///
/// # Errors
///
/// - **400 Bad Request**: id is not 1-20 alphanumerics
/// - **404 Not Found**: no such entry
pub async fn get_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EntryResponse>, AppError> {
    let entry = state.entry_service.get_entry(&id).await?;
    Ok(Json(entry.into()))
}
