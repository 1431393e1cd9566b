use anyhow::Result;

use super::super::Container;

pub struct StatusController<'a> {
    container: &'a Container,
}

impl<'a> StatusController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn status(&self, conversation_id: String, message_id: String) -> Result<String> {
        let result = self
            .container
            .status_use_case()
            .execute(&conversation_id, &message_id)
            .await?;

        Ok(serde_json::to_string_pretty(&result)?)
    }
}
