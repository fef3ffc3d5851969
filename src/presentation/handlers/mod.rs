mod chat;
mod health;

pub use chat::{ChatError, ContentResponse, ErrorResponse, chat_handler};
pub use health::health_handler;
