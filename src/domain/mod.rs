//! # Domain Layer
//!
//! Conversation, message and credential models plus the error taxonomy.
//! This layer is independent of the HTTP client and server.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
