use futures::stream::StreamExt;

use crate::application::ports::{RelayReply, RelayTransport};
use crate::infrastructure::observability::sanitize_prompt;

use super::ChatSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or a send already in flight.
    Ignored,
    Completed,
    Failed,
}

/// Drives one send of a [`ChatSession`] against the relay.
///
/// `on_update` is called after every state change (placeholder opened, chunk
/// appended, reply sealed or failed) so the caller can re-render.
pub struct ChatClient<T: RelayTransport> {
    transport: T,
}

impl<T: RelayTransport> ChatClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn send<F>(&self, session: &mut ChatSession, mut on_update: F) -> SendOutcome
    where
        F: FnMut(&ChatSession),
    {
        let Some(request) = session.submit() else {
            return SendOutcome::Ignored;
        };
        tracing::debug!(
            prompt = %sanitize_prompt(request.latest_user_text().unwrap_or_default()),
            "Sending chat request"
        );
        on_update(session);

        let outcome = match self.transport.send(&request).await {
            Ok(RelayReply::Complete(content)) => match session.apply_complete(content) {
                Ok(()) => SendOutcome::Completed,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not apply relay reply");
                    session.fail();
                    SendOutcome::Failed
                }
            },
            Ok(RelayReply::Stream(mut stream)) => {
                let mut outcome = SendOutcome::Completed;
                while let Some(chunk) = stream.next().await {
                    let applied = match chunk {
                        Ok(bytes) => session.apply_chunk(&bytes).map_err(|e| e.to_string()),
                        Err(e) => Err(e.to_string()),
                    };
                    if let Err(reason) = applied {
                        tracing::warn!(error = %reason, "Relay stream failed");
                        session.fail();
                        outcome = SendOutcome::Failed;
                        break;
                    }
                    on_update(session);
                }
                if outcome == SendOutcome::Completed {
                    if let Err(e) = session.finish() {
                        tracing::warn!(error = %e, "Relay stream ended badly");
                        session.fail();
                        outcome = SendOutcome::Failed;
                    }
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(error = %e, "Relay request failed");
                session.fail();
                SendOutcome::Failed
            }
        };

        on_update(session);
        outcome
    }
}
