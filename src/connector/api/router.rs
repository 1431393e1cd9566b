use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, DeleteController, StatusController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    status_controller: StatusController<'a>,
    delete_controller: DeleteController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            status_controller: StatusController::new(container),
            delete_controller: DeleteController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask {
                message,
                conversation,
                json,
            } => self.ask_controller.ask(message, conversation, json).await,
            Commands::Status {
                conversation_id,
                message_id,
            } => {
                self.status_controller
                    .status(conversation_id, message_id)
                    .await
            }
            Commands::Delete { conversation_id } => {
                self.delete_controller.delete(conversation_id).await
            }
            Commands::Serve { .. } => unreachable!("serve command is handled separately in main"),
        }
    }
}
