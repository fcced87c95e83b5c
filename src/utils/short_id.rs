//! Validation of short ids arriving from clients.

use crate::error::AppError;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Longest short id accepted from a client.
pub const MAX_SHORT_ID_LENGTH: usize = 20;

static SHORT_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,20}$").unwrap());

/// Validates a client-supplied short id before it reaches storage.
///
/// Accepts 1-20 ASCII alphanumerics. Generated ids are always 6 characters,
/// the wider range leaves room for ids minted by older deployments.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the id is empty, too long, or contains
/// other characters.
pub fn validate_short_id(id: &str) -> Result<(), AppError> {
    if SHORT_ID_REGEX.is_match(id) {
        return Ok(());
    }

    Err(AppError::bad_request(
        "Invalid short ID format",
        json!({ "id": id, "max_length": MAX_SHORT_ID_LENGTH }),
    ))
}
