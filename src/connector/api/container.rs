use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::application::{
    ContinueChatUseCase, DeleteConversationUseCase, GenieService, GetMessageStatusUseCase,
    PollForCompletionUseCase, StartChatUseCase,
};
use crate::connector::http::AppState;
use crate::connector::{DatabricksCredentialProvider, GenieHttpClient};
use crate::domain::PollPolicy;

pub struct ContainerConfig {
    /// Workspace URL, with or without scheme.
    pub host: Option<String>,
    pub token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub space_id: Option<String>,
    pub poll_policy: PollPolicy,
    /// Per-request timeout for every upstream call.
    pub request_timeout: Duration,
}

pub struct Container {
    credentials: Arc<DatabricksCredentialProvider>,
    genie: Arc<GenieHttpClient>,
    poller: Arc<PollForCompletionUseCase>,
    config: ContainerConfig,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let host = config.host.as_deref().and_then(normalize_host);
        debug!("Using Databricks host {:?}", host);

        let credentials = Arc::new(DatabricksCredentialProvider::new(
            http.clone(),
            host.clone(),
            config.token.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        ));
        debug!("Authenticating with {}", credentials.describe());

        let genie = Arc::new(GenieHttpClient::new(
            http,
            credentials.clone(),
            host,
            config.space_id.clone(),
        ));

        let poller = Arc::new(
            PollForCompletionUseCase::new(genie.clone()).with_policy(config.poll_policy),
        );

        Ok(Self {
            credentials,
            genie,
            poller,
            config,
        })
    }

    /// Settings that are still missing. Calls fail with a configuration
    /// error until they are provided.
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.config.host.as_deref().and_then(normalize_host).is_none() {
            missing.push("DATABRICKS_HOST");
        }
        if !self.credentials.is_configured() {
            missing.push("DATABRICKS_TOKEN or DATABRICKS_CLIENT_ID/DATABRICKS_CLIENT_SECRET");
        }
        if self.genie.space_id().is_none() {
            missing.push("DATABRICKS_GENIE_SPACE_ID");
        }
        missing
    }

    pub fn warn_if_incomplete(&self) {
        let missing = self.missing_settings();
        if !missing.is_empty() {
            warn!(
                "Incomplete Databricks configuration, requests will fail until set: {}",
                missing.join(", ")
            );
        }
    }

    pub fn genie_service(&self) -> Arc<dyn GenieService> {
        self.genie.clone()
    }

    pub fn start_chat_use_case(&self) -> StartChatUseCase {
        StartChatUseCase::new(self.genie.clone(), self.poller.clone())
    }

    pub fn continue_chat_use_case(&self) -> ContinueChatUseCase {
        ContinueChatUseCase::new(self.genie.clone(), self.poller.clone())
    }

    pub fn status_use_case(&self) -> GetMessageStatusUseCase {
        GetMessageStatusUseCase::new(self.genie.clone())
    }

    pub fn delete_use_case(&self) -> DeleteConversationUseCase {
        DeleteConversationUseCase::new(self.genie.clone())
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.genie_service(), self.config.poll_policy)
    }
}

/// Trims the workspace URL and adds `https://` when no scheme is given.
pub fn normalize_host(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains("://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}
