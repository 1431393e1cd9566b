//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Databricks credentials (static token or OAuth client credentials)
//! - Genie conversation API client
//! - HTTP surface for the chat widget (axum)
//! - Dependency container and CLI controllers

pub mod adapter;
pub mod api;
pub mod http;

pub use adapter::*;
pub use api::*;
pub use http::*;
