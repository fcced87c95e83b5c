//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - The storage contract implemented by backends
//! - [`broadcast`] - Live fanout of created entries to watchers
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Orchestration lives in services (see [`crate::application::services`])
//!
//! # Creation Flow
//!
//! 1. HTTP handler receives a URL
//! 2. [`crate::application::services::EntryService`] normalizes and stores it
//!    through [`repositories::EntryStore`]
//! 3. The resulting entry is published on [`broadcast::BroadcastHub`]
//! 4. Every live watcher receives an [`entities::EntryNotification`]

pub mod broadcast;
pub mod entities;
pub mod repositories;
