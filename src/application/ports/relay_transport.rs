use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::Stream;

use crate::domain::ChatRequest;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send + 'static>>;

/// What the relay answered with.
pub enum RelayReply {
    Complete(String),
    Stream(ByteStream),
}

/// Client side of `POST /api/chat`.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<RelayReply, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("relay returned HTTP {0}")]
    UpstreamStatus(u16),
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("stream failed: {0}")]
    StreamFailed(String),
}
