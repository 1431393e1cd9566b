pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use application::{
    ContinueChatUseCase, CredentialProvider, DeleteConversationUseCase, GenieService,
    GetMessageStatusUseCase, PollForCompletionUseCase, StartChatUseCase,
};

pub use cli::Commands;

pub use connector::{
    build_router, normalize_host, serve, AppState, Container, ContainerConfig,
    DatabricksCredentialProvider, GenieHttpClient, Router,
};

pub use domain::{
    ChatReply, Column, DomainError, MessageResponse, MessageResult, MessageStatus, PollPolicy,
    QueryResultTable,
};
