use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ChatRequest, Message, MessageRole};

/// Body accepted by `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ChatPayload {
    Prompt(String),
    History(Vec<WireMessage>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    #[serde(alias = "roles")]
    pub role: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("unknown role '{0}' at position {1}")]
    UnknownRole(String, usize),
}

/// Maps the role strings a client sends onto [`MessageRole`].
///
/// Clients disagree on how they label the assistant's own replies, so the
/// labels that count as assistant turns are configured rather than fixed.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleMapping {
    #[serde(default = "default_assistant_aliases")]
    pub assistant_aliases: Vec<String>,
}

fn default_assistant_aliases() -> Vec<String> {
    vec!["assistant".to_string(), "Assistant".to_string()]
}

impl Default for RoleMapping {
    fn default() -> Self {
        Self {
            assistant_aliases: default_assistant_aliases(),
        }
    }
}

impl RoleMapping {
    pub fn resolve(&self, label: &str) -> Option<MessageRole> {
        if self.assistant_aliases.iter().any(|alias| alias == label) {
            return Some(MessageRole::Assistant);
        }
        label.parse().ok()
    }
}

impl ChatPayload {
    pub fn into_request(self, roles: &RoleMapping) -> Result<ChatRequest, PayloadError> {
        match self {
            ChatPayload::Prompt(prompt) => Ok(ChatRequest::Prompt(prompt)),
            ChatPayload::History(wire_messages) => wire_messages
                .into_iter()
                .enumerate()
                .map(|(position, wire)| {
                    roles
                        .resolve(&wire.role)
                        .map(|role| Message::new(role, wire.content))
                        .ok_or(PayloadError::UnknownRole(wire.role, position))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ChatRequest::History),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadStyle {
    /// Send only the latest user utterance as a JSON string.
    #[default]
    Latest,
    /// Send every sealed message plus the new one as an array.
    History,
}

/// How the chat view shapes outgoing bodies.
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadFormat {
    #[serde(default)]
    pub style: PayloadStyle,
    #[serde(default = "default_role_field")]
    pub role_field: String,
    #[serde(default = "default_assistant_role")]
    pub assistant_role: String,
}

fn default_role_field() -> String {
    "role".to_string()
}

fn default_assistant_role() -> String {
    "assistant".to_string()
}

impl Default for PayloadFormat {
    fn default() -> Self {
        Self {
            style: PayloadStyle::default(),
            role_field: default_role_field(),
            assistant_role: default_assistant_role(),
        }
    }
}

impl PayloadFormat {
    pub fn encode(&self, request: &ChatRequest) -> Value {
        match request {
            ChatRequest::Prompt(prompt) => Value::String(prompt.clone()),
            ChatRequest::History(messages) => Value::Array(
                messages
                    .iter()
                    .map(|message| {
                        let label = match message.role {
                            MessageRole::Assistant => self.assistant_role.as_str(),
                            other => other.as_str(),
                        };
                        let mut object = Map::new();
                        object.insert(self.role_field.clone(), Value::String(label.to_string()));
                        object.insert("content".to_string(), Value::String(message.content.clone()));
                        Value::Object(object)
                    })
                    .collect(),
            ),
        }
    }
}
