//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to one endpoint.

pub mod create;
pub mod delete;
pub mod get;
pub mod health;
pub mod redirect;
pub mod watch;

pub use create::create_entry_handler;
pub use delete::delete_entry_handler;
pub use get::get_entry_handler;
pub use health::health_handler;
pub use redirect::redirect_handler;
pub use watch::{SseSink, watch_handler};
