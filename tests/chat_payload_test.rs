use serde_json::json;

use chat_relay::application::services::{
    ChatPayload, PayloadError, PayloadFormat, PayloadStyle, RoleMapping,
};
use chat_relay::domain::{ChatRequest, Message, MessageRole};

fn decode(body: serde_json::Value, roles: &RoleMapping) -> Result<ChatRequest, PayloadError> {
    serde_json::from_value::<ChatPayload>(body)
        .unwrap()
        .into_request(roles)
}

#[test]
fn given_json_string_when_decoding_then_yields_prompt() {
    let request = decode(json!("Hello"), &RoleMapping::default()).unwrap();

    assert_eq!(request, ChatRequest::Prompt("Hello".to_string()));
    assert_eq!(request.latest_user_text(), Some("Hello"));
}

#[test]
fn given_message_array_when_decoding_then_yields_history_in_order() {
    let request = decode(
        json!([
            {"role": "user", "content": "Hi"},
            {"role": "Assistant", "content": "Hello"},
        ]),
        &RoleMapping::default(),
    )
    .unwrap();

    assert_eq!(
        request,
        ChatRequest::History(vec![Message::user("Hi"), Message::assistant("Hello")])
    );
}

#[test]
fn given_roles_field_name_when_decoding_then_is_accepted_as_role() {
    let request = decode(
        json!([{"roles": "user", "content": "Hi"}]),
        &RoleMapping::default(),
    )
    .unwrap();

    assert_eq!(request, ChatRequest::History(vec![Message::user("Hi")]));
}

#[test]
fn given_default_mapping_when_resolving_system_then_stays_system() {
    let roles = RoleMapping::default();

    assert_eq!(roles.resolve("system"), Some(MessageRole::System));
    assert_eq!(roles.resolve("Assistant"), Some(MessageRole::Assistant));
}

#[test]
fn given_system_alias_when_resolving_system_then_maps_to_assistant() {
    let roles = RoleMapping {
        assistant_aliases: vec!["system".to_string()],
    };

    assert_eq!(roles.resolve("system"), Some(MessageRole::Assistant));
    assert_eq!(roles.resolve("user"), Some(MessageRole::User));
}

#[test]
fn given_unknown_role_when_decoding_then_reports_position() {
    let result = decode(
        json!([
            {"role": "user", "content": "Hi"},
            {"role": "bot", "content": "?"},
        ]),
        &RoleMapping::default(),
    );

    assert_eq!(result, Err(PayloadError::UnknownRole("bot".to_string(), 1)));
}

#[test]
fn given_object_body_when_parsing_then_is_rejected() {
    let result = serde_json::from_value::<ChatPayload>(json!({"prompt": "Hi"}));

    assert!(result.is_err());
}

#[test]
fn given_prompt_when_encoding_then_is_bare_json_string() {
    let format = PayloadFormat::default();

    let body = format.encode(&ChatRequest::Prompt("Hi".to_string()));

    assert_eq!(body, json!("Hi"));
}

#[test]
fn given_custom_format_when_encoding_history_then_uses_configured_labels() {
    let format = PayloadFormat {
        style: PayloadStyle::History,
        role_field: "roles".to_string(),
        assistant_role: "system".to_string(),
    };

    let body = format.encode(&ChatRequest::History(vec![
        Message::user("Hi"),
        Message::assistant("Hello"),
    ]));

    assert_eq!(
        body,
        json!([
            {"roles": "user", "content": "Hi"},
            {"roles": "system", "content": "Hello"},
        ])
    );
}

#[test]
fn given_encoded_history_when_decoded_with_matching_alias_then_roles_survive() {
    let format = PayloadFormat {
        style: PayloadStyle::History,
        role_field: "roles".to_string(),
        assistant_role: "system".to_string(),
    };
    let roles = RoleMapping {
        assistant_aliases: vec!["system".to_string()],
    };
    let original = ChatRequest::History(vec![Message::user("Hi"), Message::assistant("Hello")]);

    let decoded = decode(format.encode(&original), &roles).unwrap();

    assert_eq!(decoded, original);
}

#[test]
fn given_history_without_user_turn_when_checking_then_is_blank() {
    let request = ChatRequest::History(vec![Message::assistant("Hello")]);

    assert!(request.is_blank());
    assert!(!ChatRequest::Prompt("x".to_string()).is_blank());
}
