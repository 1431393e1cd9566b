use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::application::CredentialProvider;
use crate::domain::{CachedToken, DomainError, DEFAULT_TOKEN_LIFETIME};

const TOKEN_PATH: &str = "/oidc/v1/token";
const TOKEN_SCOPE: &str = "all-apis";

pub const MISSING_AUTH_MESSAGE: &str = "Missing Databricks configuration. Set DATABRICKS_HOST and either DATABRICKS_TOKEN or DATABRICKS_CLIENT_ID and DATABRICKS_CLIENT_SECRET.";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

#[derive(Clone)]
enum AuthMode {
    StaticToken(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    Unconfigured,
}

/// Bearer tokens for the Databricks workspace.
///
/// A pre-shared token is returned as-is. Otherwise a client-credentials
/// exchange is performed against the workspace token endpoint and the result
/// is cached until it is within [`crate::domain::TOKEN_REFRESH_BUFFER`] of
/// expiry. The cache lock is held across the exchange, so concurrent callers
/// hitting a stale cache share a single refresh.
///
/// Exchange failures are not retried; the next call tries again.
pub struct DatabricksCredentialProvider {
    client: reqwest::Client,
    host: Option<String>,
    mode: AuthMode,
    cache: Mutex<Option<CachedToken>>,
}

impl DatabricksCredentialProvider {
    /// `host` must already carry its scheme. A static `token` takes precedence
    /// over a client id/secret pair.
    pub fn new(
        client: reqwest::Client,
        host: Option<String>,
        token: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        let mode = match (token, client_id, client_secret) {
            (Some(token), _, _) if !token.is_empty() => AuthMode::StaticToken(token),
            (_, Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                AuthMode::ClientCredentials {
                    client_id,
                    client_secret,
                }
            }
            _ => AuthMode::Unconfigured,
        };

        Self {
            client,
            host,
            mode,
            cache: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.mode, AuthMode::Unconfigured)
    }

    /// Human-readable auth mode, for startup logging.
    pub fn describe(&self) -> &'static str {
        match self.mode {
            AuthMode::StaticToken(_) => "static token",
            AuthMode::ClientCredentials { .. } => "OAuth client credentials",
            AuthMode::Unconfigured => "unconfigured",
        }
    }

    async fn cached_exchange(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, DomainError> {
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| DomainError::configuration(MISSING_AUTH_MESSAGE))?;

        let mut cache = self.cache.lock().await;

        if let Some(token) = cache.as_ref() {
            if token.is_fresh(Instant::now()) {
                return Ok(token.access_token().to_string());
            }
        }

        let token = self.exchange(host, client_id, client_secret).await?;
        let access_token = token.access_token().to_string();
        *cache = Some(token);

        Ok(access_token)
    }

    async fn exchange(
        &self,
        host: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<CachedToken, DomainError> {
        debug!("Requesting OAuth token from {}", host);
        let issued_at = Instant::now();

        let response = self
            .client
            .post(format!("{host}{TOKEN_PATH}"))
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", TOKEN_SCOPE)])
            .send()
            .await
            .map_err(|e| {
                error!("Token exchange request failed: {e}");
                DomainError::auth_exchange(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token endpoint returned {status}: {body}");
            return Err(DomainError::auth_exchange(format!(
                "token endpoint returned {status}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            error!("Failed to parse token response: {e}");
            DomainError::auth_exchange(format!("invalid token response: {e}"))
        })?;

        let lifetime = token
            .expires_in
            .map(std::time::Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        debug!("Obtained OAuth token valid for {:?}", lifetime);

        Ok(CachedToken::issued(token.access_token, issued_at, lifetime))
    }
}

#[async_trait]
impl CredentialProvider for DatabricksCredentialProvider {
    async fn bearer_token(&self) -> Result<String, DomainError> {
        match &self.mode {
            AuthMode::StaticToken(token) => Ok(token.clone()),
            AuthMode::ClientCredentials {
                client_id,
                client_secret,
            } => self.cached_exchange(client_id, client_secret).await,
            AuthMode::Unconfigured => Err(DomainError::configuration(MISSING_AUTH_MESSAGE)),
        }
    }
}
