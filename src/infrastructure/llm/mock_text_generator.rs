use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::application::ports::{TextGenerationError, TextGenerator, TextStream};
use crate::domain::Message;

#[derive(Debug, Clone)]
enum Script {
    Chunks(Vec<String>),
    Echo,
    FailOnCall,
    InterruptAfter(Vec<String>),
}

/// Scripted generator for tests and for running the relay without provider
/// credentials.
pub struct MockTextGenerator {
    script: Script,
    chunk_delay: Duration,
    last_messages: Mutex<Option<Vec<Message>>>,
}

impl MockTextGenerator {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            chunk_delay: Duration::ZERO,
            last_messages: Mutex::new(None),
        }
    }

    pub fn reply(content: impl Into<String>) -> Self {
        Self::with_script(Script::Chunks(vec![content.into()]))
    }

    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Answers with `Echo: <latest user message>`, streamed word by word.
    pub fn echo() -> Self {
        Self::with_script(Script::Echo)
    }

    pub fn failing() -> Self {
        Self::with_script(Script::FailOnCall)
    }

    /// Streams `chunks`, then fails instead of ending cleanly.
    pub fn interrupted_after<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::InterruptAfter(
            chunks.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Messages received by the most recent call.
    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.last_messages
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn record(&self, messages: &[Message]) {
        if let Ok(mut guard) = self.last_messages.lock() {
            *guard = Some(messages.to_vec());
        }
    }

    fn planned_chunks(&self, messages: &[Message]) -> Result<(Vec<String>, bool), TextGenerationError> {
        match &self.script {
            Script::Chunks(chunks) => Ok((chunks.clone(), false)),
            Script::Echo => {
                let latest = messages
                    .iter()
                    .rev()
                    .find(|m| m.role.is_user())
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                let echo = format!("Echo: {}", latest);
                let words = echo
                    .split_inclusive(' ')
                    .map(String::from)
                    .collect::<Vec<_>>();
                Ok((words, false))
            }
            Script::FailOnCall => Err(TextGenerationError::ApiRequestFailed(
                "mock upstream failure".to_string(),
            )),
            Script::InterruptAfter(chunks) => Ok((chunks.clone(), true)),
        }
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn complete(&self, messages: &[Message]) -> Result<String, TextGenerationError> {
        self.record(messages);
        let (chunks, interrupted) = self.planned_chunks(messages)?;
        if interrupted {
            return Err(TextGenerationError::ApiRequestFailed(
                "mock upstream failure".to_string(),
            ));
        }
        Ok(chunks.concat())
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream, TextGenerationError> {
        self.record(messages);
        let (chunks, interrupted) = self.planned_chunks(messages)?;
        let delay = self.chunk_delay;

        let mut items: Vec<Result<String, TextGenerationError>> =
            chunks.into_iter().map(Ok).collect();
        if interrupted {
            items.push(Err(TextGenerationError::StreamInterrupted(
                "mock stream interrupted".to_string(),
            )));
        }

        let token_stream = stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            item
        });

        Ok(Box::pin(token_stream))
    }
}
