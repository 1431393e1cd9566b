use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::GenieService;
use crate::domain::{
    DomainError, MessageResponse, MessageResult, MessageStatus, PostedMessage, StartedConversation,
};

/// In-memory [`GenieService`] that replays a scripted sequence of statuses.
///
/// Once the script runs out every further status call reports
/// `EXECUTING_QUERY`.
pub(crate) struct ScriptedGenie {
    statuses: Mutex<VecDeque<Result<MessageResult, DomainError>>>,
    status_calls: AtomicU32,
    started: Mutex<Vec<String>>,
    sent: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
}

impl ScriptedGenie {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            status_calls: AtomicU32::new(0),
            started: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn then_status(self, result: MessageResult) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(result));
        self
    }

    pub fn then_pending(self, times: usize) -> Self {
        for _ in 0..times {
            self.statuses
                .lock()
                .unwrap()
                .push_back(Ok(message("m-1", "EXECUTING_QUERY")));
        }
        self
    }

    pub fn then_error(self, error: DomainError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

pub(crate) fn message(message_id: &str, status: &str) -> MessageResult {
    MessageResult::new(message_id, MessageStatus::from(status))
}

pub(crate) fn completed(message_id: &str, text: &str, query: Option<&str>) -> MessageResult {
    MessageResult::new(message_id, MessageStatus::Completed)
        .with_response(MessageResponse::new(text, query.map(String::from)))
}

#[async_trait]
impl GenieService for ScriptedGenie {
    async fn start_conversation(&self, content: &str) -> Result<StartedConversation, DomainError> {
        self.started.lock().unwrap().push(content.to_string());
        Ok(StartedConversation {
            conversation_id: "c-1".to_string(),
            message_id: "m-1".to_string(),
            status: MessageStatus::from("SUBMITTED"),
        })
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<PostedMessage, DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((conversation_id.to_string(), content.to_string()));
        Ok(PostedMessage {
            message_id: "m-2".to_string(),
            status: MessageStatus::from("SUBMITTED"),
        })
    }

    async fn get_message_status(
        &self,
        _conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageResult, DomainError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            Some(next) => next,
            None => Ok(message(message_id, "EXECUTING_QUERY")),
        }
    }

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), DomainError> {
        self.deleted.lock().unwrap().push(conversation_id.to_string());
        Ok(())
    }
}
