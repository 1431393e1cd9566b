use anyhow::Result;
use serde_json::Value;

use crate::domain::{ChatReply, QueryResultTable};

use super::super::Container;

/// Rows shown before the table is cut off.
const MAX_ROWS_SHOWN: usize = 10;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn ask(
        &self,
        message: String,
        conversation: Option<String>,
        json: bool,
    ) -> Result<String> {
        let reply = match conversation {
            Some(conversation_id) => {
                self.container
                    .continue_chat_use_case()
                    .execute(&conversation_id, &message)
                    .await?
            }
            None => {
                self.container
                    .start_chat_use_case()
                    .execute(&message)
                    .await?
            }
        };

        if json {
            return Ok(serde_json::to_string_pretty(&reply)?);
        }

        Ok(self.format_reply(&reply))
    }

    fn format_reply(&self, reply: &ChatReply) -> String {
        let mut output = format!(
            "Conversation: {} (message {})\n\n",
            reply.conversation_id, reply.message_id
        );

        let Some(response) = &reply.response else {
            output.push_str("No response received from Genie.\n");
            return output;
        };

        if !response.text.is_empty() {
            output.push_str(&response.text);
            output.push_str("\n\n");
        }

        if let Some(query) = &response.query {
            output.push_str("SQL:\n");
            for line in query.lines() {
                output.push_str(&format!("   | {}\n", line));
            }
            output.push('\n');
        }

        if let Some(data) = &response.data {
            output.push_str(&format_table(data));
        }

        output
    }
}

fn format_cell(cell: &Value) -> String {
    match cell {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Plain-text table of the first rows, with column widths fitted to content.
fn format_table(table: &QueryResultTable) -> String {
    if table.schema.is_empty() || table.is_empty() {
        return String::new();
    }

    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(MAX_ROWS_SHOWN)
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = table.schema.iter().map(|c| c.name.chars().count()).collect();
    for row in &shown {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut output = render(table.column_names());
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');

    for row in &shown {
        output.push_str(&render(row.iter().map(String::as_str).collect()));
        output.push('\n');
    }

    if table.row_count() > MAX_ROWS_SHOWN {
        output.push_str(&format!(
            "Showing {} of {} rows\n",
            MAX_ROWS_SHOWN,
            table.row_count()
        ));
    }

    output
}
