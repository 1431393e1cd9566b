//! # Application Layer
//!
//! Ports to the Genie service and the use cases the HTTP handlers and CLI
//! drive: start, continue, poll, status and delete.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
