mod credential;
mod message;
mod poll_policy;
mod query_result;

pub use credential::*;
pub use message::*;
pub use poll_policy::*;
pub use query_result::*;
