use std::sync::Arc;

use tracing::info;

use crate::application::{GenieService, PollForCompletionUseCase};
use crate::domain::{ChatReply, DomainError};

/// Posts a follow-up question to an existing conversation and waits for the
/// answer. The conversation must already exist upstream; none is created.
pub struct ContinueChatUseCase {
    genie: Arc<dyn GenieService>,
    poller: Arc<PollForCompletionUseCase>,
}

impl ContinueChatUseCase {
    pub fn new(genie: Arc<dyn GenieService>, poller: Arc<PollForCompletionUseCase>) -> Self {
        Self { genie, poller }
    }

    pub async fn execute(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<ChatReply, DomainError> {
        if conversation_id.is_empty() {
            return Err(DomainError::invalid_input(
                "conversationId and message are required",
            ));
        }
        if message.trim().is_empty() {
            return Err(DomainError::invalid_input(
                "Message must be a non-empty string",
            ));
        }

        let posted = self.genie.send_message(conversation_id, message).await?;
        info!(
            "Posted message {} to conversation {} ({})",
            posted.message_id, conversation_id, posted.status
        );

        let result = self
            .poller
            .execute(conversation_id, &posted.message_id)
            .await?;

        Ok(ChatReply {
            conversation_id: conversation_id.to_string(),
            message_id: posted.message_id,
            response: result.response,
        })
    }
}
