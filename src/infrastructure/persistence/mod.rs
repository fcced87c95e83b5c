//! Entry store implementations.
//!
//! Both backends implement [`crate::domain::repositories::EntryStore`] and
//! are selected once at startup by `DATABASE_MODE`.
//!
//! # Backends
//!
//! - [`MemoryEntryStore`] - Process-local maps, lost on restart
//! - [`RedisEntryStore`] - Redis keys `id:<id>` and `hash:<hash>`

pub mod memory_entry_store;
pub mod redis_entry_store;

pub use memory_entry_store::MemoryEntryStore;
pub use redis_entry_store::RedisEntryStore;
