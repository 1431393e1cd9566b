use std::sync::Arc;

use crate::application::GenieService;
use crate::domain::{DomainError, MessageResult};

/// Single status lookup without polling.
pub struct GetMessageStatusUseCase {
    genie: Arc<dyn GenieService>,
}

impl GetMessageStatusUseCase {
    pub fn new(genie: Arc<dyn GenieService>) -> Self {
        Self { genie }
    }

    pub async fn execute(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageResult, DomainError> {
        if conversation_id.is_empty() || message_id.is_empty() {
            return Err(DomainError::invalid_input(
                "conversationId and messageId query parameters are required",
            ));
        }

        self.genie
            .get_message_status(conversation_id, message_id)
            .await
    }
}
