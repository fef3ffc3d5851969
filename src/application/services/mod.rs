mod chat_client;
mod chat_payload;
mod chat_session;
mod prompt_format;
mod relay_service;

pub use chat_client::{ChatClient, SendOutcome};
pub use chat_payload::{ChatPayload, PayloadError, PayloadFormat, PayloadStyle, RoleMapping, WireMessage};
pub use chat_session::{
    ChatPhase, ChatSession, DecodeError, ERROR_MESSAGE, SessionError, Utf8ChunkDecoder,
};
pub use prompt_format::{llama3_prompt, with_system_prompt};
pub use relay_service::{RelayError, RelayMode, RelayService};
