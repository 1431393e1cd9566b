mod credential_provider;
mod genie_service;

pub use credential_provider::*;
pub use genie_service::*;
