use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the chat proxy HTTP server
    Serve {
        #[arg(short, long, default_value = "7071")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },

    /// Ask Genie a question and wait for the answer
    Ask {
        message: String,

        /// Continue an existing conversation instead of starting a new one
        #[arg(short, long)]
        conversation: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Fetch the current status of a message once
    Status {
        conversation_id: String,
        message_id: String,
    },

    /// Delete a conversation from the Genie space
    Delete {
        conversation_id: String,
    },
}
