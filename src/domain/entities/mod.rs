//! Core domain entities.
//!
//! - [`Entry`] - A stored short-id/URL/hash tuple
//! - [`EntryNotification`] - The payload watchers receive when an entry is created

pub mod entry;

pub use entry::{Entry, EntryNotification};
