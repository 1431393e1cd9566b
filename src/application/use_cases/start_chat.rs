use std::sync::Arc;

use tracing::info;

use crate::application::{GenieService, PollForCompletionUseCase};
use crate::domain::{ChatReply, DomainError};

/// Opens a new conversation with the first question and waits for the answer.
pub struct StartChatUseCase {
    genie: Arc<dyn GenieService>,
    poller: Arc<PollForCompletionUseCase>,
}

impl StartChatUseCase {
    pub fn new(genie: Arc<dyn GenieService>, poller: Arc<PollForCompletionUseCase>) -> Self {
        Self { genie, poller }
    }

    pub async fn execute(&self, message: &str) -> Result<ChatReply, DomainError> {
        if message.trim().is_empty() {
            return Err(DomainError::invalid_input("Message is required"));
        }

        let started = self.genie.start_conversation(message).await?;
        info!(
            "Started conversation {} (message {}, {})",
            started.conversation_id, started.message_id, started.status
        );

        let result = self
            .poller
            .execute(&started.conversation_id, &started.message_id)
            .await?;

        Ok(ChatReply {
            conversation_id: started.conversation_id,
            message_id: started.message_id,
            response: result.response,
        })
    }
}
