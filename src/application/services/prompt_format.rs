use crate::domain::{Message, MessageRole};

const BEGIN_OF_TEXT: &str = "<|begin_of_text|>";
const END_OF_TURN: &str = "<|eot_id|>";

fn header(role: &str) -> String {
    format!("<|start_header_id|>{}<|end_header_id|>\n\n", role)
}

/// Renders turns into a Llama 3 instruct prompt ending with an open
/// assistant header.
pub fn llama3_prompt(system_prompt: &str, messages: &[Message]) -> String {
    let mut prompt = String::from(BEGIN_OF_TEXT);

    if !system_prompt.trim().is_empty() {
        prompt.push_str(&header(MessageRole::System.as_str()));
        prompt.push_str(system_prompt.trim());
        prompt.push_str(END_OF_TURN);
    }

    for message in messages {
        prompt.push_str(&header(message.role.as_str()));
        prompt.push_str(message.content.trim());
        prompt.push_str(END_OF_TURN);
    }

    prompt.push_str(&header(MessageRole::Assistant.as_str()));
    prompt
}

/// Prepends the system prompt to the turns, OpenAI chat style.
pub fn with_system_prompt(system_prompt: &str, messages: &[Message]) -> Vec<Message> {
    let mut shaped = Vec::with_capacity(messages.len() + 1);
    if !system_prompt.trim().is_empty() {
        shaped.push(Message::system(system_prompt));
    }
    shaped.extend(messages.iter().cloned());
    shaped
}
