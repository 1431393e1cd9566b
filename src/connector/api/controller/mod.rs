pub mod ask_controller;
pub mod delete_controller;
pub mod status_controller;

pub use ask_controller::AskController;
pub use delete_controller::DeleteController;
pub use status_controller::StatusController;
