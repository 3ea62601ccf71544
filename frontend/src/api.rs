use std::future::Future;
use std::pin::pin;

use futures_util::future::{select, Either};
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use support_chat::models::{ChatRequest, EscalationAck, EscalationMetadata, EscalationRequest};
use support_chat::{ChatConfig, ChatError, ChatReply, SupportBackend};

/// Support backend reached over `fetch`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    chat_url: String,
    escalate_url: String,
    timeout_ms: u32,
}

impl HttpBackend {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            chat_url: config.chat_url(),
            escalate_url: config.escalate_url(),
            timeout_ms: config.request_timeout_ms,
        }
    }
}

impl SupportBackend for HttpBackend {
    async fn send_chat_turn(
        &self,
        session_id: &str,
        message: &str,
        contact_email: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        let body = ChatRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
            user_email: contact_email.map(|s| s.to_string()),
        };

        let request = Request::post(&self.chat_url)
            .json(&body)
            .map_err(|e| ChatError::Encode(e.to_string()))?;
        let resp = with_timeout(request.send(), self.timeout_ms)
            .await?
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !resp.ok() {
            return Err(ChatError::ServerStatus { status: resp.status() });
        }

        resp.json::<ChatReply>()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))
    }

    async fn send_escalation(
        &self,
        query: &str,
        metadata: &EscalationMetadata,
        user_email: &str,
    ) -> Result<(), ChatError> {
        let body = EscalationRequest {
            query: query.to_string(),
            metadata: metadata.clone(),
            user_email: user_email.to_string(),
        };

        let request = Request::post(&self.escalate_url)
            .json(&body)
            .map_err(|e| ChatError::Encode(e.to_string()))?;
        let resp = with_timeout(request.send(), self.timeout_ms)
            .await?
            .map_err(|e| ChatError::Network(e.to_string()))?;

        if !resp.ok() {
            return Err(ChatError::ServerStatus { status: resp.status() });
        }

        // The body is optional; only an explicit `"status": "error"` fails.
        let text = resp.text().await.unwrap_or_default();
        EscalationAck::from_body(&text).into_result()
    }
}

/// Races `fut` against a timer. The losing request is left to finish on its own.
async fn with_timeout<F: Future>(fut: F, timeout_ms: u32) -> Result<F::Output, ChatError> {
    let fut = pin!(fut);
    match select(fut, TimeoutFuture::new(timeout_ms)).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(ChatError::Timeout { after_ms: timeout_ms }),
    }
}
