//! Application layer services implementing business logic.
//!
//! Services coordinate URL validation, the storage contract and the
//! broadcast hub, and give HTTP handlers a single entry point.
//!
//! # Available Services
//!
//! - [`services::entry_service::EntryService`] - Entry creation, lookup and deletion

pub mod services;
