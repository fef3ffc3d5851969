use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::domain::Message;

pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, TextGenerationError>> + Send + 'static>>;

/// A hosted text-generation provider.
///
/// Implementations own the provider-specific request shape. Callers hand over
/// the conversation turns (system prompt excluded) and get either the whole
/// generation or its text deltas in arrival order.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, TextGenerationError>;

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream, TextGenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TextGenerationError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.5,
            top_p: 0.9,
        }
    }
}
