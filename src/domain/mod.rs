mod chat_request;
mod conversation;
mod message;
mod message_role;

pub use chat_request::ChatRequest;
pub use conversation::{Conversation, ConversationError};
pub use message::Message;
pub use message_role::MessageRole;
