mod databricks_credentials;
mod genie_http_client;

pub use databricks_credentials::*;
pub use genie_http_client::*;
