mod continue_chat;
mod delete_conversation;
mod get_message_status;
mod poll_for_completion;
mod start_chat;

#[cfg(test)]
pub(crate) mod test_support;

pub use continue_chat::*;
pub use delete_conversation::*;
pub use get_message_status::*;
pub use poll_for_completion::*;
pub use start_chat::*;
