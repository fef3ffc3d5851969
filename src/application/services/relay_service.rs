use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::{TextGenerationError, TextGenerator, TextStream};
use crate::domain::{ChatRequest, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// Wait for the whole generation and answer with `{"content": ...}`.
    #[default]
    Batch,
    /// Forward text deltas as a raw chunked body.
    Stream,
}

/// Forwards chat requests to the configured provider without touching the
/// generated text.
pub struct RelayService {
    generator: Arc<dyn TextGenerator>,
    mode: RelayMode,
}

impl RelayService {
    pub fn new(generator: Arc<dyn TextGenerator>, mode: RelayMode) -> Self {
        Self { generator, mode }
    }

    pub fn mode(&self) -> RelayMode {
        self.mode
    }

    pub async fn relay(&self, request: ChatRequest) -> Result<String, RelayError> {
        let messages = Self::validated(request)?;
        let content = self
            .generator
            .complete(&messages)
            .await
            .map_err(RelayError::Generation)?;

        tracing::debug!(chars = content.len(), "Upstream generation complete");
        Ok(content)
    }

    pub async fn relay_stream(&self, request: ChatRequest) -> Result<TextStream, RelayError> {
        let messages = Self::validated(request)?;
        self.generator
            .complete_stream(&messages)
            .await
            .map_err(RelayError::Generation)
    }

    fn validated(request: ChatRequest) -> Result<Vec<Message>, RelayError> {
        if request.is_blank() {
            return Err(RelayError::EmptyRequest);
        }
        Ok(request.into_messages())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("no user message provided")]
    EmptyRequest,
    #[error("generation: {0}")]
    Generation(#[from] TextGenerationError),
}
