use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GenerationParams, TextGenerationError, TextGenerator, TextStream};
use crate::application::services::with_system_prompt;
use crate::domain::Message;

/// Client for `/chat/completions` on OpenAI-compatible hosts (OpenRouter,
/// OpenAI, LM Studio).
pub struct OpenAiCompatibleClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    params: GenerationParams,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<UpstreamError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct UpstreamError {
    #[serde(default)]
    message: String,
}

enum SseLine {
    Delta(String),
    Done,
    Failed(String),
    Skip,
}

fn parse_sse_line(line: &[u8]) -> SseLine {
    let line = String::from_utf8_lossy(line);
    let Some(data) = line.trim_end().strip_prefix("data:") else {
        return SseLine::Skip;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                return SseLine::Failed(error.message);
            }
            chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .filter(|content| !content.is_empty())
                .map(SseLine::Delta)
                .unwrap_or(SseLine::Skip)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable stream event");
            SseLine::Failed(format!("malformed stream event: {}", e))
        }
    }
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        params: GenerationParams,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            params,
            system_prompt: system_prompt.into(),
        }
    }

    fn build_request(&self, messages: &[Message], stream: bool) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &self.model,
            messages: with_system_prompt(&self.system_prompt, messages)
                .into_iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content,
                })
                .collect(),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
            stream: stream.then_some(true),
        }
    }

    async fn post(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<reqwest::Response, TextGenerationError> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TextGenerationError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TextGenerationError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TextGenerationError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, TextGenerationError> {
        let body = self.build_request(messages, false);
        let response = self.post(&body).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TextGenerationError::InvalidResponse(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| TextGenerationError::InvalidResponse("empty choices".to_string()))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream, TextGenerationError> {
        let body = self.build_request(messages, true);
        let response = self.post(&body).await?;
        let mut bytes = response.bytes_stream();

        let token_stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        buffer.extend_from_slice(&chunk);
                        while let Some(end) = buffer.iter().position(|b| *b == b'\n') {
                            let line: Vec<u8> = buffer.drain(..=end).collect();
                            match parse_sse_line(&line) {
                                SseLine::Delta(text) => yield Ok(text),
                                SseLine::Done => return,
                                SseLine::Failed(message) => {
                                    yield Err(TextGenerationError::StreamInterrupted(message));
                                    return;
                                }
                                SseLine::Skip => {}
                            }
                        }
                    }
                    Err(e) => {
                        yield Err(TextGenerationError::StreamInterrupted(e.to_string()));
                        return;
                    }
                }
            }
            match parse_sse_line(&buffer) {
                SseLine::Delta(text) => yield Ok(text),
                SseLine::Failed(message) => {
                    yield Err(TextGenerationError::StreamInterrupted(message));
                }
                SseLine::Done | SseLine::Skip => {}
            }
        };

        Ok(Box::pin(token_stream))
    }
}
