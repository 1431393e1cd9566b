//! Chat HTTP server built on axum.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::application::{
    ContinueChatUseCase, GenieService, GetMessageStatusUseCase, PollForCompletionUseCase,
    StartChatUseCase,
};
use crate::domain::PollPolicy;

use super::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    start_chat: Arc<StartChatUseCase>,
    continue_chat: Arc<ContinueChatUseCase>,
    get_status: Arc<GetMessageStatusUseCase>,
}

impl AppState {
    pub fn new(genie: Arc<dyn GenieService>, policy: PollPolicy) -> Self {
        let poller = Arc::new(PollForCompletionUseCase::new(genie.clone()).with_policy(policy));

        Self {
            start_chat: Arc::new(StartChatUseCase::new(genie.clone(), poller.clone())),
            continue_chat: Arc::new(ContinueChatUseCase::new(genie.clone(), poller)),
            get_status: Arc::new(GetMessageStatusUseCase::new(genie)),
        }
    }

    pub fn start_chat(&self) -> &StartChatUseCase {
        &self.start_chat
    }

    pub fn continue_chat(&self) -> &ContinueChatUseCase {
        &self.continue_chat
    }

    pub fn get_status(&self) -> &GetMessageStatusUseCase {
        &self.get_status
    }
}

/// Routes for the chat widget.
///
/// - POST /start, POST /continue, GET /status
/// - the same handlers under /api/startChat, /api/sendMessage, /api/getStatus
/// - GET /health
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/start", post(handlers::start_chat))
        .route("/continue", post(handlers::continue_chat))
        .route("/status", get(handlers::get_status))
        .route("/api/startChat", post(handlers::start_chat))
        .route("/api/sendMessage", post(handlers::continue_chat))
        .route("/api/getStatus", get(handlers::get_status))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the chat routes until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Chat API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("chat API server error")?;

    info!("Chat API stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            warn!("Cannot listen for Ctrl-C ({e}); serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
