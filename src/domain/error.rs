use thiserror::Error;

/// Message returned when the poll budget runs out before a terminal status.
pub const POLL_TIMEOUT_MESSAGE: &str = "Query timeout - taking too long to complete";

#[derive(Debug, Error)]
pub enum DomainError {
    /// Required settings (host, credentials, space id) are missing.
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Token exchange failed: {0}")]
    AuthExchange(String),

    /// A call to the Genie API failed. The message is the caller-facing
    /// summary; upstream detail is logged where the failure happens.
    #[error("{0}")]
    Upstream(String),

    /// The message reached FAILED or CANCELLED.
    #[error("{0}")]
    QueryFailed(String),

    #[error("{}", POLL_TIMEOUT_MESSAGE)]
    PollTimeout { attempts: u32 },
}

impl DomainError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn auth_exchange(msg: impl Into<String>) -> Self {
        Self::AuthExchange(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_query_failed(&self) -> bool {
        matches!(self, Self::QueryFailed(_))
    }

    pub fn is_poll_timeout(&self) -> bool {
        matches!(self, Self::PollTimeout { .. })
    }
}
