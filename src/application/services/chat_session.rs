use crate::domain::{ChatRequest, Conversation, ConversationError, Message, MessageRole};

use super::PayloadStyle;

/// Shown in place of the reply when a send fails.
pub const ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Sending,
    Streaming,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no send in flight")]
    NotLoading,
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Conversation(#[from] ConversationError),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid utf-8 after {0} valid bytes")]
    InvalidUtf8(usize),
    #[error("stream ended inside a utf-8 sequence ({0} dangling bytes)")]
    Truncated(usize),
}

/// Incremental UTF-8 decoder that tolerates multi-byte sequences split
/// across chunk boundaries.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String, DecodeError> {
        self.pending.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                self.pending.clear();
                return Err(DecodeError::InvalidUtf8(e.valid_up_to()));
            }
        };

        let rest = self.pending.split_off(valid_up_to);
        let decoded = std::mem::replace(&mut self.pending, rest);
        String::from_utf8(decoded).map_err(|e| DecodeError::InvalidUtf8(e.utf8_error().valid_up_to()))
    }

    pub fn finish(&mut self) -> Result<(), DecodeError> {
        let dangling = self.pending.len();
        self.pending.clear();
        if dangling > 0 {
            return Err(DecodeError::Truncated(dangling));
        }
        Ok(())
    }
}

/// In-memory state of the chat view: the message log, the input field and
/// the `loading` flag.
#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Conversation,
    input: String,
    loading: bool,
    streaming: bool,
    style: PayloadStyle,
    decoder: Utf8ChunkDecoder,
}

impl ChatSession {
    pub fn new(style: PayloadStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> ChatPhase {
        match (self.loading, self.streaming) {
            (false, _) => ChatPhase::Idle,
            (true, false) => ChatPhase::Sending,
            (true, true) => ChatPhase::Streaming,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    /// Moves the trimmed input into the log and opens an empty assistant
    /// placeholder. Returns the body to send, or `None` when the input is
    /// blank or a send is already in flight.
    pub fn submit(&mut self) -> Option<ChatRequest> {
        if self.loading {
            return None;
        }
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let user_message = Message::user(text);

        let request = match self.style {
            PayloadStyle::Latest => ChatRequest::Prompt(user_message.content.clone()),
            PayloadStyle::History => ChatRequest::History(
                self.conversation
                    .history()
                    .cloned()
                    .chain(std::iter::once(user_message.clone()))
                    .collect(),
            ),
        };

        if let Err(e) = self
            .conversation
            .push(user_message)
            .and_then(|_| self.conversation.begin_reply(MessageRole::Assistant))
        {
            tracing::warn!(error = %e, "Cannot open a reply placeholder");
            return None;
        }

        self.input.clear();
        self.loading = true;
        self.streaming = false;
        self.decoder = Utf8ChunkDecoder::default();
        Some(request)
    }

    /// Appends one received chunk to the placeholder. A chunk that is not
    /// valid UTF-8 fails the send.
    pub fn apply_chunk(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        if !self.loading {
            return Err(SessionError::NotLoading);
        }
        self.streaming = true;

        match self.decoder.decode(chunk) {
            Ok(text) => {
                self.conversation.append_to_reply(&text)?;
                Ok(())
            }
            Err(e) => {
                self.fail();
                Err(e.into())
            }
        }
    }

    /// Fills the placeholder with a complete (non-streamed) reply.
    pub fn apply_complete(&mut self, content: String) -> Result<(), SessionError> {
        if !self.loading {
            return Err(SessionError::NotLoading);
        }
        self.conversation.replace_reply(content)?;
        self.finish()
    }

    /// Seals the placeholder once the stream has ended.
    pub fn finish(&mut self) -> Result<(), SessionError> {
        if !self.loading {
            return Err(SessionError::NotLoading);
        }
        if let Err(e) = self.decoder.finish() {
            self.fail();
            return Err(e.into());
        }
        self.conversation.finish_reply()?;
        self.loading = false;
        self.streaming = false;
        Ok(())
    }

    /// Replaces the placeholder with [`ERROR_MESSAGE`] and returns to idle.
    pub fn fail(&mut self) {
        if self
            .conversation
            .replace_reply(ERROR_MESSAGE.to_string())
            .is_ok()
        {
            let _ = self.conversation.finish_reply();
        }
        self.decoder = Utf8ChunkDecoder::default();
        self.loading = false;
        self.streaming = false;
    }
}
