use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::application::GenieService;
use crate::domain::{DomainError, MessageResult, MessageStatus, PollPolicy};

/// Waits for an already-sent message to reach a terminal status.
///
/// Polling stops at the first terminal status. There is no cancellation: once
/// started the loop runs until a terminal status, an upstream error, or the
/// attempt budget of the [`PollPolicy`] is spent.
pub struct PollForCompletionUseCase {
    genie: Arc<dyn GenieService>,
    policy: PollPolicy,
}

impl PollForCompletionUseCase {
    pub fn new(genie: Arc<dyn GenieService>) -> Self {
        Self {
            genie,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    pub async fn execute(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<MessageResult, DomainError> {
        let start_time = Instant::now();
        let max_attempts = self.policy.max_attempts();

        for attempt in 0..max_attempts {
            let result = self
                .genie
                .get_message_status(conversation_id, message_id)
                .await?;

            match &result.status {
                MessageStatus::Completed => {
                    info!(
                        "Message {} completed after {} poll(s) in {:?}",
                        message_id,
                        attempt + 1,
                        start_time.elapsed()
                    );
                    return Ok(result);
                }
                MessageStatus::Failed | MessageStatus::Cancelled => {
                    let reason = result.error.clone().unwrap_or_else(|| {
                        format!("Query {}", result.status.as_str().to_lowercase())
                    });
                    warn!("Message {} ended as {}: {}", message_id, result.status, reason);
                    return Err(DomainError::query_failed(reason));
                }
                MessageStatus::Pending(status) => {
                    debug!(
                        "Message {} is {} (attempt {}/{})",
                        message_id,
                        status,
                        attempt + 1,
                        max_attempts
                    );
                }
            }

            if attempt + 1 < max_attempts {
                sleep(self.policy.delay_for(attempt)).await;
            }
        }

        warn!(
            "Gave up on message {} after {} polls ({:?})",
            message_id,
            max_attempts,
            start_time.elapsed()
        );
        Err(DomainError::PollTimeout {
            attempts: max_attempts,
        })
    }
}
