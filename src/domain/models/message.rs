use std::fmt;

use serde::{Deserialize, Serialize};

use super::QueryResultTable;

/// Status of a Genie message.
///
/// Only the three terminal statuses are interpreted; every other value the
/// service reports (`SUBMITTED`, `ASKING_AI`, `EXECUTING_QUERY`, ...) is kept
/// verbatim as a pending status so it can be passed back to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageStatus {
    Completed,
    Failed,
    Cancelled,
    Pending(String),
}

impl MessageStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MessageStatus::Completed => "COMPLETED",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Cancelled => "CANCELLED",
            MessageStatus::Pending(raw) => raw,
        }
    }

    /// No further polling is valid once a terminal status is observed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MessageStatus::Pending(_))
    }
}

impl From<String> for MessageStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "COMPLETED" => MessageStatus::Completed,
            "FAILED" => MessageStatus::Failed,
            "CANCELLED" => MessageStatus::Cancelled,
            _ => MessageStatus::Pending(raw),
        }
    }
}

impl From<&str> for MessageStatus {
    fn from(raw: &str) -> Self {
        MessageStatus::from(raw.to_string())
    }
}

impl From<MessageStatus> for String {
    fn from(status: MessageStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answer carried by a completed message: the first attachment's text,
/// its generated SQL, and the tabular result when one could be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub text: String,
    pub query: Option<String>,
    pub data: Option<QueryResultTable>,
}

impl MessageResponse {
    pub fn new(text: impl Into<String>, query: Option<String>) -> Self {
        Self {
            text: text.into(),
            query,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Option<QueryResultTable>) -> Self {
        self.data = data;
        self
    }
}

/// Snapshot of one message as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResult {
    pub status: MessageStatus,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<MessageResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResult {
    pub fn new(message_id: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            status,
            message_id: message_id.into(),
            response: None,
            error: None,
        }
    }

    pub fn with_response(mut self, response: MessageResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Identifiers issued when a new conversation is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedConversation {
    pub conversation_id: String,
    pub message_id: String,
    pub status: MessageStatus,
}

/// Identifiers issued when a follow-up message is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub message_id: String,
    pub status: MessageStatus,
}

/// Body returned by the start and continue endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub conversation_id: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<MessageResponse>,
}
