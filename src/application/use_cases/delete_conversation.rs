use std::sync::Arc;

use tracing::info;

use crate::application::GenieService;
use crate::domain::DomainError;

/// Use case for deleting a conversation upstream to free space capacity.
pub struct DeleteConversationUseCase {
    genie: Arc<dyn GenieService>,
}

impl DeleteConversationUseCase {
    pub fn new(genie: Arc<dyn GenieService>) -> Self {
        Self { genie }
    }

    pub async fn execute(&self, conversation_id: &str) -> Result<(), DomainError> {
        if conversation_id.trim().is_empty() {
            return Err(DomainError::invalid_input("conversationId is required"));
        }

        info!("Deleting conversation: {}", conversation_id);
        self.genie.delete_conversation(conversation_id).await?;
        info!("Conversation deleted successfully");

        Ok(())
    }
}
