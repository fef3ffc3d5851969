use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::error::DisplayErrorContext;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::ResponseStream;
use serde::{Deserialize, Serialize};

use crate::application::ports::{GenerationParams, TextGenerationError, TextGenerator, TextStream};
use crate::application::services::llama3_prompt;
use crate::domain::Message;

pub const DEFAULT_BEDROCK_MODEL: &str = "meta.llama3-8b-instruct-v1:0";
pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";

/// Meta Llama 3 on Amazon Bedrock through `InvokeModel` and
/// `InvokeModelWithResponseStream`.
pub struct BedrockClient {
    client: Client,
    model_id: String,
    params: GenerationParams,
    system_prompt: String,
}

#[derive(Serialize)]
struct LlamaRequest {
    prompt: String,
    max_gen_len: u32,
    temperature: f32,
    top_p: f32,
}

/// Both the complete body and each stream chunk carry `generation`.
#[derive(Deserialize)]
struct LlamaGeneration {
    #[serde(default)]
    generation: Option<String>,
}

impl BedrockClient {
    pub fn new(
        client: Client,
        model_id: impl Into<String>,
        params: GenerationParams,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            params,
            system_prompt: system_prompt.into(),
        }
    }

    /// Builds the SDK client from the default AWS credential chain.
    pub async fn from_env(
        region: impl Into<String>,
        model_id: impl Into<String>,
        params: GenerationParams,
        system_prompt: impl Into<String>,
    ) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.into()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), model_id, params, system_prompt)
    }

    fn request_body(&self, messages: &[Message]) -> Result<Blob, TextGenerationError> {
        let request = LlamaRequest {
            prompt: llama3_prompt(&self.system_prompt, messages),
            max_gen_len: self.params.max_tokens,
            temperature: self.params.temperature,
            top_p: self.params.top_p,
        };
        serde_json::to_vec(&request)
            .map(Blob::new)
            .map_err(|e| TextGenerationError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl TextGenerator for BedrockClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, TextGenerationError> {
        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(self.request_body(messages)?)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|service_error| service_error.is_throttling_exception())
                {
                    TextGenerationError::RateLimited
                } else {
                    TextGenerationError::ApiRequestFailed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let response: LlamaGeneration = serde_json::from_slice(output.body().as_ref())
            .map_err(|e| TextGenerationError::InvalidResponse(e.to_string()))?;

        Ok(response.generation.unwrap_or_default())
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream, TextGenerationError> {
        let output = self
            .client
            .invoke_model_with_response_stream()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(self.request_body(messages)?)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|service_error| service_error.is_throttling_exception())
                {
                    TextGenerationError::RateLimited
                } else {
                    TextGenerationError::ApiRequestFailed(DisplayErrorContext(&e).to_string())
                }
            })?;

        let mut events = output.body;
        let token_stream = async_stream::stream! {
            loop {
                match events.recv().await {
                    Ok(Some(ResponseStream::Chunk(part))) => {
                        let Some(payload) = part.bytes() else {
                            continue;
                        };
                        match serde_json::from_slice::<LlamaGeneration>(payload.as_ref()) {
                            Ok(chunk) => {
                                if let Some(text) = chunk.generation.filter(|t| !t.is_empty()) {
                                    yield Ok(text);
                                }
                            }
                            Err(e) => {
                                yield Err(TextGenerationError::InvalidResponse(e.to_string()));
                                break;
                            }
                        }
                    }
                    Ok(Some(other)) => {
                        tracing::debug!(event = ?other, "Ignoring unknown Bedrock stream event");
                    }
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(TextGenerationError::StreamInterrupted(
                            DisplayErrorContext(&e).to_string(),
                        ));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(token_stream))
    }
}
