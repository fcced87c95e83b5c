//! Handler for entry deletion.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

/// Deletes an entry and both of its index records.
///
/// # Endpoint
///
/// `DELETE /api/{id}`
///
/// # Response Codes
///
/// - **204 No Content**: entry removed, or it never existed
/// - **400 Bad Request**: malformed id
pub async fn delete_entry_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.entry_service.delete_entry(&id).await?;
    info!(id = %id, "Entry deleted");

    Ok(StatusCode::NO_CONTENT)
}
