use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::application::{CredentialProvider, GenieService};
use crate::domain::{
    DomainError, MessageResponse, MessageResult, MessageStatus, PostedMessage, QueryResultFetch,
    QueryResultTable, StartedConversation,
};

use super::MISSING_AUTH_MESSAGE;

const API_PREFIX: &str = "/api/2.0/genie/spaces";
const MISSING_SPACE_MESSAGE: &str = "DATABRICKS_GENIE_SPACE_ID not configured";

const START_FAILED: &str = "Failed to start conversation with Genie";
const SEND_FAILED: &str = "Failed to send message to Genie";
const STATUS_FAILED: &str = "Failed to get message status from Genie";
const DELETE_FAILED: &str = "Failed to delete conversation";

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct EntityId {
    id: String,
}

#[derive(Deserialize)]
struct MessageHeader {
    id: String,
    status: MessageStatus,
}

#[derive(Deserialize)]
struct StartConversationResponse {
    conversation: EntityId,
    message: MessageHeader,
}

#[derive(Deserialize)]
struct GenieMessage {
    id: String,
    status: MessageStatus,
    #[serde(default)]
    attachments: Option<Vec<Attachment>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct Attachment {
    text: Option<TextAttachment>,
    query: Option<QueryAttachment>,
}

#[derive(Deserialize)]
struct TextAttachment {
    value: Option<String>,
    content: Option<String>,
}

impl TextAttachment {
    fn into_text(self) -> Option<String> {
        self.value.or(self.content)
    }
}

#[derive(Deserialize)]
struct QueryAttachment {
    query: Option<String>,
    result_id: Option<String>,
}

/// reqwest-based client for the Genie conversation API of one space.
///
/// Each operation is a single authenticated request. Failures are logged with
/// the upstream status and body and surfaced as [`DomainError::Upstream`] with
/// a fixed, caller-facing message. The only call allowed to fail silently is
/// the secondary query-result fetch (see [`GenieHttpClient::fetch_query_result`]).
pub struct GenieHttpClient {
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    host: Option<String>,
    space_id: Option<String>,
}

impl GenieHttpClient {
    /// `host` must already carry its scheme (see `normalize_host`).
    pub fn new(
        client: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        host: Option<String>,
        space_id: Option<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            host,
            space_id: space_id.filter(|s| !s.is_empty()),
        }
    }

    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    fn space_url(&self, suffix: &str) -> Result<String, DomainError> {
        let space_id = self
            .space_id
            .as_deref()
            .ok_or_else(|| DomainError::configuration(MISSING_SPACE_MESSAGE))?;
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| DomainError::configuration(MISSING_AUTH_MESSAGE))?;

        Ok(format!("{host}{API_PREFIX}/{space_id}{suffix}"))
    }

    async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, DomainError> {
        let token = self.credentials.bearer_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(request: RequestBuilder, failure: &'static str) -> Result<Response, DomainError> {
        let response = request.send().await.map_err(|e| {
            error!("{failure}: request error: {e}");
            DomainError::upstream(failure)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("{failure}: Genie API returned {status}: {body}");
            return Err(DomainError::upstream(failure));
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(
        response: Response,
        failure: &'static str,
    ) -> Result<T, DomainError> {
        response.json().await.map_err(|e| {
            error!("{failure}: unexpected response body: {e}");
            DomainError::upstream(failure)
        })
    }

    /// Fetches the tabular result referenced by a completed message.
    ///
    /// Never fails: a transport error, a non-2xx status or an unrecognized
    /// payload yields [`QueryResultFetch::Unavailable`] with the logged cause.
    pub async fn fetch_query_result(
        &self,
        conversation_id: &str,
        message_id: &str,
        result_id: &str,
    ) -> QueryResultFetch {
        let outcome = match self.try_fetch_query_result(conversation_id, message_id, result_id).await
        {
            Ok(payload) => match QueryResultTable::from_payload(&payload) {
                Some(table) => QueryResultFetch::Loaded(table),
                None => QueryResultFetch::Unavailable("unrecognized query result payload".into()),
            },
            Err(cause) => QueryResultFetch::Unavailable(cause),
        };

        if let QueryResultFetch::Unavailable(cause) = &outcome {
            warn!("Failed to fetch query result data for message {message_id}: {cause}");
        }

        outcome
    }

    async fn try_fetch_query_result(
        &self,
        conversation_id: &str,
        message_id: &str,
        result_id: &str,
    ) -> Result<Value, String> {
        let url = self
            .space_url(&format!(
                "/conversations/{conversation_id}/messages/{message_id}/query-result/{result_id}"
            ))
            .map_err(|e| e.to_string())?;
        let request = self
            .request(Method::GET, &url)
            .await
            .map_err(|e| e.to_string())?;

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("Genie API returned {status}"));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

/// Text of the `error` field of a FAILED message, which the API reports
/// either as a plain string or as an object.
fn describe_error(error: Option<&Value>) -> String {
    let described = match error {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj
            .get("error")
            .or_else(|| obj.get("message"))
            .and_then(Value::as_str)
            .map(String::from)
            .or_else(|| Some(Value::Object(obj.clone()).to_string())),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };

    described
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Query failed".to_string())
}

#[async_trait]
impl GenieService for GenieHttpClient {
    async fn start_conversation(&self, content: &str) -> Result<StartedConversation, DomainError> {
        let url = self.space_url("/start-conversation")?;
        let request = self
            .request(Method::POST, &url)
            .await?
            .json(&ContentRequest { content });

        let response = Self::send(request, START_FAILED).await?;
        let body: StartConversationResponse = Self::parse(response, START_FAILED).await?;

        Ok(StartedConversation {
            conversation_id: body.conversation.id,
            message_id: body.message.id,
            status: body.message.status,
        })
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<PostedMessage, DomainError> {
        let url = self.space_url(&format!("/conversations/{conversation_id}/messages"))?;
        let request = self
            .request(Method::POST, &url)
            .await?
            .json(&ContentRequest { content });

        let response = Self::send(request, SEND_FAILED).await?;
        let body: MessageHeader = Self::parse(response, SEND_FAILED).await?;

        Ok(PostedMessage {
            message_id: body.id,
            status: body.status,
        })
    }

    async fn get_message_status(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageResult, DomainError> {
        let url = self.space_url(&format!(
            "/conversations/{conversation_id}/messages/{message_id}"
        ))?;
        let request = self.request(Method::GET, &url).await?;

        let response = Self::send(request, STATUS_FAILED).await?;
        let message: GenieMessage = Self::parse(response, STATUS_FAILED).await?;
        debug!("Message {} status: {}", message.id, message.status);

        let mut result = MessageResult::new(message.id, message.status.clone());

        match message.status {
            MessageStatus::Completed => {
                let first = message.attachments.unwrap_or_default().into_iter().next();
                if let Some(attachment) = first {
                    let text = attachment
                        .text
                        .and_then(TextAttachment::into_text)
                        .unwrap_or_default();
                    let (query, result_id) = match attachment.query {
                        Some(q) => (q.query, q.result_id),
                        None => (None, None),
                    };

                    let data = match result_id {
                        Some(result_id) => self
                            .fetch_query_result(conversation_id, message_id, &result_id)
                            .await
                            .into_table(),
                        None => None,
                    };

                    result = result.with_response(MessageResponse::new(text, query).with_data(data));
                }
            }
            MessageStatus::Failed => {
                result = result.with_error(describe_error(message.error.as_ref()));
            }
            _ => {}
        }

        Ok(result)
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), DomainError> {
        let url = self.space_url(&format!("/conversations/{conversation_id}"))?;
        let request = self.request(Method::DELETE, &url).await?;

        Self::send(request, DELETE_FAILED).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::connector::adapter::DatabricksCredentialProvider;

    const SPACE: &str = "/api/2.0/genie/spaces/space-1";

    fn test_client(server: &MockServer) -> GenieHttpClient {
        client_with_space(server, Some("space-1"))
    }

    fn client_with_space(server: &MockServer, space_id: Option<&str>) -> GenieHttpClient {
        let http = reqwest::Client::new();
        let credentials = Arc::new(DatabricksCredentialProvider::new(
            http.clone(),
            Some(server.uri()),
            Some("dapi-test".into()),
            None,
            None,
        ));
        GenieHttpClient::new(
            http,
            credentials,
            Some(server.uri()),
            space_id.map(String::from),
        )
    }

    async fn mount_message(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("{SPACE}/conversations/c-1/messages/m-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn describe_error_accepts_strings_and_objects() {
        assert_eq!(describe_error(Some(&json!("boom"))), "boom");
        assert_eq!(
            describe_error(Some(&json!({"error": "bad sql", "type": "SQL"}))),
            "bad sql"
        );
        assert_eq!(describe_error(Some(&json!({"message": "nope"}))), "nope");
        assert_eq!(describe_error(Some(&json!(""))), "Query failed");
        assert_eq!(describe_error(None), "Query failed");
    }

    #[tokio::test]
    async fn start_conversation_posts_content_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{SPACE}/start-conversation")))
            .and(header("authorization", "Bearer dapi-test"))
            .and(body_json(json!({"content": "How many races?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "conversation": {"id": "c-1"},
                "message": {"id": "m-1", "status": "SUBMITTED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let started = test_client(&server)
            .start_conversation("How many races?")
            .await
            .unwrap();

        assert_eq!(started.conversation_id, "c-1");
        assert_eq!(started.message_id, "m-1");
        assert_eq!(started.status, MessageStatus::Pending("SUBMITTED".into()));
    }

    #[tokio::test]
    async fn start_conversation_failure_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{SPACE}/start-conversation")))
            .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .start_conversation("hi")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Upstream(_)));
        assert_eq!(err.to_string(), START_FAILED);
    }

    #[tokio::test]
    async fn missing_space_id_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_with_space(&server, None)
            .start_conversation("hi")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Configuration(_)));
        assert_eq!(err.to_string(), MISSING_SPACE_MESSAGE);
    }

    #[tokio::test]
    async fn send_message_posts_to_conversation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{SPACE}/conversations/c-1/messages")))
            .and(body_json(json!({"content": "And in 2020?"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "m-2", "status": "SUBMITTED"})),
            )
            .mount(&server)
            .await;

        let posted = test_client(&server)
            .send_message("c-1", "And in 2020?")
            .await
            .unwrap();

        assert_eq!(posted.message_id, "m-2");
    }

    #[tokio::test]
    async fn completed_without_result_reference_skips_secondary_fetch() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({
                "id": "m-1",
                "status": "COMPLETED",
                "attachments": [
                    {"text": {"value": "42 races"}, "query": {"query": "SELECT count(*) FROM races"}}
                ]
            }),
        )
        .await;
        Mock::given(path_regex(".*/query-result/.*"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        let response = result.response.unwrap();
        assert_eq!(response.text, "42 races");
        assert_eq!(response.query.as_deref(), Some("SELECT count(*) FROM races"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn text_attachment_reads_content_or_value() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({
                "id": "m-1",
                "status": "COMPLETED",
                "attachments": [{"text": {"content": "42 races", "value": "42 races"}}]
            }),
        )
        .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        assert_eq!(result.status, MessageStatus::Completed);
        assert_eq!(result.response.unwrap().text, "42 races");
    }

    #[tokio::test]
    async fn content_only_text_attachment_is_read() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({
                "id": "m-1",
                "status": "COMPLETED",
                "attachments": [{"text": {"content": "Hamilton"}}]
            }),
        )
        .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        assert_eq!(result.response.unwrap().text, "Hamilton");
    }

    #[tokio::test]
    async fn completed_with_result_reference_loads_table() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({
                "id": "m-1",
                "status": "COMPLETED",
                "attachments": [
                    {"text": {"content": "Top drivers"}, "query": {"query": "SELECT ...", "result_id": "r-1"}}
                ]
            }),
        )
        .await;
        Mock::given(method("GET"))
            .and(path(format!(
                "{SPACE}/conversations/c-1/messages/m-1/query-result/r-1"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statement_response": {
                    "manifest": {"schema": {"columns": [{"name": "driver"}]}},
                    "result": {"data_array": [["Hamilton"], ["Verstappen"]]}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        let response = result.response.unwrap();
        assert_eq!(response.text, "Top drivers");
        let data = response.data.unwrap();
        assert_eq!(data.column_names(), vec!["driver"]);
        assert_eq!(data.row_count(), 2);
    }

    #[tokio::test]
    async fn failed_result_fetch_keeps_text_and_query() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({
                "id": "m-1",
                "status": "COMPLETED",
                "attachments": [
                    {"text": {"value": "Here you go"}, "query": {"query": "SELECT 1", "result_id": "r-1"}}
                ]
            }),
        )
        .await;
        Mock::given(path_regex(".*/query-result/r-1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("warehouse stopped"))
            .mount(&server)
            .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        let response = result.response.unwrap();
        assert_eq!(response.text, "Here you go");
        assert_eq!(response.query.as_deref(), Some("SELECT 1"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn fetch_query_result_reports_cause() {
        let server = MockServer::start().await;
        Mock::given(path_regex(".*/query-result/r-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let outcome = test_client(&server)
            .fetch_query_result("c-1", "m-1", "r-1")
            .await;

        assert!(matches!(outcome, QueryResultFetch::Unavailable(_)));
        assert!(outcome.into_table().is_none());
    }

    #[tokio::test]
    async fn completed_without_attachments_has_no_response() {
        let server = MockServer::start().await;
        mount_message(&server, json!({"id": "m-1", "status": "COMPLETED"})).await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        assert_eq!(result.status, MessageStatus::Completed);
        assert!(result.response.is_none());
    }

    #[tokio::test]
    async fn failed_message_carries_error() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({"id": "m-1", "status": "FAILED", "error": {"error": "Warehouse unavailable"}}),
        )
        .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        assert_eq!(result.status, MessageStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("Warehouse unavailable"));
    }

    #[tokio::test]
    async fn pending_message_has_neither_response_nor_error() {
        let server = MockServer::start().await;
        mount_message(
            &server,
            json!({"id": "m-1", "status": "EXECUTING_QUERY", "attachments": null}),
        )
        .await;

        let result = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap();

        assert!(!result.is_terminal());
        assert!(result.response.is_none());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn status_failure_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .get_message_status("c-1", "m-1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), STATUS_FAILED);
    }

    #[tokio::test]
    async fn delete_conversation_issues_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{SPACE}/conversations/c-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).delete_conversation("c-1").await.unwrap();
    }

    #[tokio::test]
    async fn delete_failure_is_wrapped() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .delete_conversation("c-404")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), DELETE_FAILED);
    }
}
