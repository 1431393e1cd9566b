use anyhow::Result;

use super::super::Container;

pub struct DeleteController<'a> {
    container: &'a Container,
}

impl<'a> DeleteController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn delete(&self, conversation_id: String) -> Result<String> {
        self.container
            .delete_use_case()
            .execute(&conversation_id)
            .await?;

        Ok(self.format_delete_success(&conversation_id))
    }

    fn format_delete_success(&self, conversation_id: &str) -> String {
        format!("Conversation {} deleted successfully.", conversation_id)
    }
}
