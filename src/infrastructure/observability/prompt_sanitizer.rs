const MAX_VISIBLE_CHARS: usize = 100;

const SENSITIVE_PREFIXES: [&str; 6] = [
    "Bearer ",
    "api_key=",
    "apiKey=",
    "password=",
    "secret=",
    "token=",
];

/// Shortens user text for logs and masks anything that looks like a
/// credential.
pub fn sanitize_prompt(prompt: &str) -> String {
    let trimmed = prompt.trim();

    if trimmed.is_empty() {
        return String::from("[EMPTY]");
    }

    let total_chars = trimmed.chars().count();
    let visible = if total_chars > MAX_VISIBLE_CHARS {
        let cut: String = trimmed.chars().take(MAX_VISIBLE_CHARS).collect();
        format!("{}... ({} chars total)", cut, total_chars)
    } else {
        trimmed.to_string()
    };

    let redacted = SENSITIVE_PREFIXES
        .iter()
        .fold(visible, |text, prefix| redact_after(&text, prefix));

    redact_openrouter_keys(&redacted)
}

fn redact_after(text: &str, prefix: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find(prefix) {
        let value_start = idx + prefix.len();
        result.push_str(&rest[..value_start]);
        result.push_str("[REDACTED]");
        let value_len = rest[value_start..]
            .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
            .unwrap_or(rest.len() - value_start);
        rest = &rest[value_start + value_len..];
    }

    result.push_str(rest);
    result
}

fn redact_openrouter_keys(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if word.starts_with("sk-") && word.len() > 12 {
                "sk-[REDACTED]"
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
