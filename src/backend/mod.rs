use crate::errors::ChatError;
use crate::models::{ChatReply, EscalationMetadata};

/// The remote support service.
///
/// Both calls are fire-once: no retries and no idempotency keys. Any failure
/// (network, timeout, non-2xx, undecodable body) comes back as a transport
/// [`ChatError`]. Futures are not required to be `Send`, since the browser
/// transport is single-threaded.
#[allow(async_fn_in_trait)]
pub trait SupportBackend {
    /// `POST /chat`
    async fn send_chat_turn(
        &self,
        session_id: &str,
        message: &str,
        contact_email: Option<&str>,
    ) -> Result<ChatReply, ChatError>;

    /// `POST /escalate`. Only success or failure matters to the caller.
    async fn send_escalation(
        &self,
        query: &str,
        metadata: &EscalationMetadata,
        user_email: &str,
    ) -> Result<(), ChatError>;
}
