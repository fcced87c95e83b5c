//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Storage**: Backend ping and entry count
/// 2. **Broadcast**: Fanout queue open, live subscriber count
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "storage": { "status": "ok", "message": "redis backend, 42 entries" },
///     "broadcast": { "status": "ok", "message": "2 subscribers, queue capacity 100" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = check_storage(&state).await;
    let broadcast = check_broadcast(&state);

    let all_healthy = storage.is_ok() && broadcast.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { storage, broadcast },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Pings the storage backend and counts its entries.
async fn check_storage(state: &AppState) -> CheckStatus {
    let service = &state.entry_service;
    let backend = service.backend();

    if !service.storage_reachable().await {
        return CheckStatus::error(format!("{} backend unreachable", backend));
    }

    match service.count_entries().await {
        Ok(count) => CheckStatus::ok(format!("{} backend, {} entries", backend, count)),
        Err(e) => CheckStatus::error(format!("{} backend error: {}", backend, e)),
    }
}

/// Checks that the hub still accepts notifications.
fn check_broadcast(state: &AppState) -> CheckStatus {
    if state.hub.is_open() {
        CheckStatus::ok(format!(
            "{} subscribers, queue capacity {}",
            state.hub.subscriber_count(),
            state.hub.queue_capacity()
        ))
    } else {
        CheckStatus::error("Broadcast queue is closed")
    }
}
