use super::{Message, MessageRole};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversationError {
    #[error("no message in progress")]
    NoMessageInProgress,
    #[error("a reply is already in progress at index {0}")]
    ReplyInProgress(usize),
}

/// Append-only message log.
///
/// At most one entry, always the tail, may be open for writing while a reply
/// streams in. It is addressed by index and sealed by [`Conversation::finish_reply`];
/// every other entry is immutable once pushed.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    in_progress: Option<usize>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> Result<usize, ConversationError> {
        if let Some(index) = self.in_progress {
            return Err(ConversationError::ReplyInProgress(index));
        }
        self.messages.push(message);
        Ok(self.messages.len() - 1)
    }

    /// Opens an empty reply at the tail of the log.
    pub fn begin_reply(&mut self, role: MessageRole) -> Result<usize, ConversationError> {
        let index = self.push(Message::new(role, String::new()))?;
        self.in_progress = Some(index);
        Ok(index)
    }

    pub fn append_to_reply(&mut self, text: &str) -> Result<(), ConversationError> {
        let index = self.in_progress.ok_or(ConversationError::NoMessageInProgress)?;
        self.messages[index].content.push_str(text);
        Ok(())
    }

    pub fn replace_reply(&mut self, content: String) -> Result<(), ConversationError> {
        let index = self.in_progress.ok_or(ConversationError::NoMessageInProgress)?;
        self.messages[index].content = content;
        Ok(())
    }

    pub fn finish_reply(&mut self) -> Result<usize, ConversationError> {
        self.in_progress
            .take()
            .ok_or(ConversationError::NoMessageInProgress)
    }

    pub fn in_progress_index(&self) -> Option<usize> {
        self.in_progress
    }

    pub fn in_progress(&self) -> Option<&Message> {
        self.in_progress.map(|index| &self.messages[index])
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Sealed messages only, in insertion order.
    pub fn history(&self) -> impl Iterator<Item = &Message> {
        let open = self.in_progress;
        self.messages
            .iter()
            .enumerate()
            .filter(move |(index, _)| Some(*index) != open)
            .map(|(_, message)| message)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
