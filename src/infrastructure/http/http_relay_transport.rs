use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::application::ports::{RelayReply, RelayTransport, TransportError};
use crate::application::services::PayloadFormat;
use crate::domain::ChatRequest;

#[derive(Deserialize)]
struct ContentResponse {
    content: String,
}

/// Posts chat requests to a relay over HTTP.
///
/// A JSON answer is read whole; anything else is handed back as the raw
/// byte stream.
pub struct HttpRelayTransport {
    client: Client,
    url: String,
    format: PayloadFormat,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, format: PayloadFormat) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            format,
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &ChatRequest) -> Result<RelayReply, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.format.encode(request))
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::UpstreamStatus(response.status().as_u16()));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        if is_json {
            let body: ContentResponse = response
                .json()
                .await
                .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
            return Ok(RelayReply::Complete(body.content));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::StreamFailed(e.to_string())));
        Ok(RelayReply::Stream(Box::pin(stream)))
    }
}
