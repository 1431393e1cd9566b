use async_trait::async_trait;

use crate::domain::DomainError;

/// Supplies the bearer token used for Genie API calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, DomainError>;
}
