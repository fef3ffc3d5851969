use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use futures::stream::StreamExt;
use serde::Serialize;

use crate::application::ports::{TextGenerationError, TextStream};
use crate::application::services::{ChatPayload, RelayError, RelayMode};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ContentResponse {
    pub content: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ChatError,
}

#[derive(Serialize)]
pub struct ChatError {
    pub message: String,
    pub r#type: String,
}

fn bad_request(message: String) -> Response {
    tracing::warn!(message = %message, "Rejected chat request");
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: ChatError {
                message,
                r#type: "invalid_request_error".to_string(),
            },
        }),
    )
        .into_response()
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

/// Any body that is not a chat payload gets a 400 `ErrorResponse`, whatever
/// its content type.
#[tracing::instrument(skip(state, body), fields(mode = ?state.relay_service.mode()))]
pub async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: ChatPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return bad_request(format!("Invalid chat payload: {}", e)),
    };

    let request = match payload.into_request(&state.roles) {
        Ok(request) => request,
        Err(e) => return bad_request(e.to_string()),
    };

    tracing::debug!(
        prompt = %sanitize_prompt(request.latest_user_text().unwrap_or_default()),
        "Relaying chat request"
    );

    match state.relay_service.mode() {
        RelayMode::Batch => match state.relay_service.relay(request).await {
            Ok(content) => {
                tracing::info!("Chat relay successful");
                (StatusCode::OK, Json(ContentResponse { content })).into_response()
            }
            Err(RelayError::EmptyRequest) => bad_request("No user message provided".to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Error invoking model");
                internal_error()
            }
        },
        RelayMode::Stream => match state.relay_service.relay_stream(request).await {
            Ok(tokens) => stream_response(tokens),
            Err(RelayError::EmptyRequest) => bad_request("No user message provided".to_string()),
            Err(e) => {
                tracing::error!(error = %e, "Error opening upstream stream");
                internal_error()
            }
        },
    }
}

/// Forwards each delta as soon as it arrives. An upstream error is passed on
/// as a body error, which aborts the chunked response.
fn stream_response(mut tokens: TextStream) -> Response {
    let body_stream = async_stream::stream! {
        let mut forwarded = 0usize;
        while let Some(token) = tokens.next().await {
            match token {
                Ok(text) => {
                    forwarded += 1;
                    yield Ok::<Bytes, TextGenerationError>(Bytes::from(text));
                }
                Err(e) => {
                    tracing::error!(error = %e, chunks = forwarded, "Upstream stream failed");
                    yield Err(e);
                    break;
                }
            }
        }
        tracing::debug!(chunks = forwarded, "Relay stream closed");
    };

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body_stream),
    )
        .into_response()
}
