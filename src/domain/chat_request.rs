use super::Message;

/// Body of one relay call: either the latest utterance alone or the full
/// ordered history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatRequest {
    Prompt(String),
    History(Vec<Message>),
}

impl ChatRequest {
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            ChatRequest::Prompt(prompt) => vec![Message::user(prompt)],
            ChatRequest::History(messages) => messages,
        }
    }

    /// Content of the most recent user turn.
    pub fn latest_user_text(&self) -> Option<&str> {
        match self {
            ChatRequest::Prompt(prompt) => Some(prompt.as_str()),
            ChatRequest::History(messages) => messages
                .iter()
                .rev()
                .find(|m| m.role.is_user())
                .map(|m| m.content.as_str()),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.latest_user_text()
            .map(|text| text.trim().is_empty())
            .unwrap_or(true)
    }
}
