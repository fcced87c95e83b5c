//! HTTP layer translating requests into entry operations.
//!
//! # Modules
//!
//! - [`dto`] - Request/response bodies
//! - [`handlers`] - Axum handlers, one per endpoint
//! - [`middleware`] - Request tracing
//! - [`routes`] - The `/api` route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
