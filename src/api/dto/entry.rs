//! DTOs for entry endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Entry;

/// Request to store a URL.
///
/// Scheme-less input such as `example.com` is accepted; the service
/// normalizes it before storing.
#[derive(Debug, Deserialize, Validate)]
pub struct EntryRequest {
    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
}

/// A stored entry as returned to clients.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryResponse {
    pub id: String,
    pub url: String,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            url: entry.url,
        }
    }
}
