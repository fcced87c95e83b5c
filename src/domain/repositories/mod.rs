//! Repository trait definitions for the domain layer.
//!
//! - [`EntryStore`] - Content-addressed entry storage
//!
//! Implementations live in `crate::infrastructure::persistence`; a mock is
//! generated via `mockall` for unit tests.
//!
//! # Testing
//!
//! See `tests/store_contract.rs` for the suite every backend must pass.

pub mod entry_store;

pub use entry_store::{EntryStore, MAX_ID_ATTEMPTS, StoreError, StoreResult};

#[cfg(test)]
pub use entry_store::MockEntryStore;
