//! HTTP request handlers for the chat endpoints.
//!
//! Handles POST /start, POST /continue, GET /status and GET /health.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::domain::DomainError;

use super::server::AppState;

/// Request body for POST /start.
///
/// Fields are loosely typed so that a wrong JSON type is reported as a
/// validation error rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct StartChatRequest {
    #[serde(default)]
    pub message: Option<Value>,
}

/// Request body for POST /continue.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueChatRequest {
    #[serde(default)]
    pub conversation_id: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Query parameters for GET /status.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn non_empty_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str).filter(|s| !s.is_empty())
}

impl StartChatRequest {
    fn validate(&self) -> Result<&str, DomainError> {
        non_empty_str(&self.message)
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_input("Message is required"))
    }
}

impl ContinueChatRequest {
    fn validate(&self) -> Result<(&str, &str), DomainError> {
        let present = |v: &Option<Value>| match v {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };

        let conversation_id = match non_empty_str(&self.conversation_id) {
            Some(id) if present(&self.message) => id,
            _ => {
                return Err(DomainError::invalid_input(
                    "conversationId and message are required",
                ))
            }
        };

        let message = self
            .message
            .as_ref()
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| DomainError::invalid_input("Message must be a non-empty string"))?;

        Ok((conversation_id, message))
    }
}

impl StatusParams {
    fn validate(&self) -> Result<(&str, &str), DomainError> {
        match (self.conversation_id.as_deref(), self.message_id.as_deref()) {
            (Some(c), Some(m)) if !c.is_empty() && !m.is_empty() => Ok((c, m)),
            _ => Err(DomainError::invalid_input(
                "conversationId and messageId query parameters are required",
            )),
        }
    }
}

/// Maps a failure to a JSON error response and logs it for operators.
/// Validation failures are client errors and are never logged as faults.
fn error_response(operation: &str, err: DomainError) -> Response {
    let status = if err.is_invalid_input() {
        warn!("Rejected {operation} request: {err}");
        StatusCode::BAD_REQUEST
    } else {
        error!("Error in {operation}: {err}");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn invalid_body(operation: &str, rejection: JsonRejection) -> Response {
    warn!("Rejected {operation} request body: {rejection}");
    error_response(operation, DomainError::invalid_input("Invalid JSON body"))
}

/// POST /start
///
/// Starts a new conversation and waits for the first answer.
pub async fn start_chat(
    State(state): State<AppState>,
    body: Result<Json<StartChatRequest>, JsonRejection>,
) -> Response {
    info!("Starting new Genie conversation");

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body("startChat", rejection),
    };

    let message = match body.validate() {
        Ok(message) => message,
        Err(err) => return error_response("startChat", err),
    };

    match state.start_chat().execute(message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => error_response("startChat", err),
    }
}

/// POST /continue
///
/// Posts a follow-up question to an existing conversation.
pub async fn continue_chat(
    State(state): State<AppState>,
    body: Result<Json<ContinueChatRequest>, JsonRejection>,
) -> Response {
    info!("Sending message to existing conversation");

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body("sendMessage", rejection),
    };

    let (conversation_id, message) = match body.validate() {
        Ok(fields) => fields,
        Err(err) => return error_response("sendMessage", err),
    };

    match state
        .continue_chat()
        .execute(conversation_id, message)
        .await
    {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(err) => error_response("sendMessage", err),
    }
}

/// GET /status?conversationId=&messageId=
///
/// Returns the current state of one message without polling.
pub async fn get_status(
    State(state): State<AppState>,
    params: Result<Query<StatusParams>, QueryRejection>,
) -> Response {
    info!("Getting message status");

    let params = params.map(|Query(p)| p).unwrap_or_default();
    let (conversation_id, message_id) = match params.validate() {
        Ok(ids) => ids,
        Err(err) => return error_response("getStatus", err),
    };

    match state
        .get_status()
        .execute(conversation_id, message_id)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => error_response("getStatus", err),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
