use async_trait::async_trait;

use crate::domain::{DomainError, MessageResult, PostedMessage, StartedConversation};

/// The four conversation operations of a Genie space.
///
/// Every call is a one-shot request: no caching, retries or idempotency keys.
/// Conversation ids are supplied by the caller and are not checked locally.
#[async_trait]
pub trait GenieService: Send + Sync {
    /// Open a new conversation whose first message is `content`.
    async fn start_conversation(&self, content: &str) -> Result<StartedConversation, DomainError>;

    /// Post a follow-up message to an existing conversation.
    async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<PostedMessage, DomainError>;

    /// Fetch the current state of a message.
    ///
    /// On COMPLETED with attachments the first attachment's text, query and
    /// (when referenced) result table are extracted. A failing result-table
    /// fetch leaves `data` empty instead of failing the call.
    async fn get_message_status(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageResult, DomainError>;

    async fn delete_conversation(&self, conversation_id: &str) -> Result<(), DomainError>;
}
