//! Utility functions for id generation, URL processing, and request validation.
//!
//! - [`id_generator`] - Content hashing and random short ids
//! - [`url_normalizer`] - URL normalization and validation
//! - [`short_id`] - Validation of client-supplied short ids

pub mod id_generator;
pub mod short_id;
pub mod url_normalizer;
