//! # URL Watch
//!
//! A URL shortener with content-addressed deduplication and a live feed of
//! newly stored links, built with Axum and (optionally) Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Entries, the storage contract and the broadcast hub
//! - **Application Layer** ([`application`]) - Entry service orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - In-memory and Redis stores
//! - **API Layer** ([`api`]) - HTTP handlers, DTOs and middleware
//!
//! ## Features
//!
//! - Each distinct URL is stored once, keyed by its SHA-256 digest
//! - Random 6-character alphanumeric ids
//! - Server-Sent Events feed of every stored entry (`GET /api/watch`)
//! - Swappable storage backend selected at startup
//!
//! ## Quick Start
//!
//! ```bash
//! # In-memory (default)
//! cargo run
//!
//! # Redis
//! export DATABASE_MODE=redis
//! export REDIS_URL="redis://localhost:6379/7"
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::EntryService;
    pub use crate::domain::broadcast::{BroadcastHub, EntrySink, Termination};
    pub use crate::domain::entities::{Entry, EntryNotification};
    pub use crate::domain::repositories::{EntryStore, StoreError};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
