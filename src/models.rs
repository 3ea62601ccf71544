use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ChatError;

/// Who (or what) produced a transcript entry. `Typing` and `Error` are
/// client-side only and never come back from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Bot,
    Typing,
    Error,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Bot => "bot",
            MessageRole::Typing => "typing",
            MessageRole::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One transcript entry.
///
/// The serialized field names (`ts`, `escalate`) are the ones browsers already
/// hold in local storage, so older snapshots keep decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "ts", default)]
    pub timestamp: i64,
    #[serde(rename = "escalate", default, skip_serializing_if = "is_false")]
    pub escalate_offered: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Message {
    pub fn new(role: MessageRole, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: Some(text.into()),
            timestamp,
            escalate_offered: false,
        }
    }

    pub fn user(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageRole::User, text, timestamp)
    }

    pub fn bot(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageRole::Bot, text, timestamp)
    }

    pub fn error(text: impl Into<String>, timestamp: i64) -> Self {
        Self::new(MessageRole::Error, text, timestamp)
    }

    /// The "response pending" placeholder. Carries no text.
    pub fn typing(timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: MessageRole::Typing,
            text: None,
            timestamp,
            escalate_offered: false,
        }
    }

    pub fn offering_escalation(mut self) -> Self {
        self.escalate_offered = true;
        self
    }

    pub fn is_typing(&self) -> bool {
        self.role == MessageRole::Typing
    }
}

/// Rejects chat input that is empty once surrounding whitespace is removed.
pub fn validate_message(text: &str) -> Result<&str, ChatError> {
    if text.trim().is_empty() {
        return Err(ChatError::empty_field("message"));
    }
    Ok(text)
}

// ── Wire types ────────────────────────────────────────────────────────────────

/// Request body for `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
    pub user_email: Option<String>,
}

/// What the backend wants the client to do with a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    EscalateRequest,
    Answer,
    #[serde(other)]
    Other,
}

/// Response body of `POST /chat`. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub action: Option<ChatAction>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl ChatReply {
    pub fn answer(message: impl Into<String>) -> Self {
        Self {
            action: Some(ChatAction::Answer),
            message: Some(message.into()),
            source: None,
        }
    }

    pub fn escalate(message: Option<String>) -> Self {
        Self {
            action: Some(ChatAction::EscalateRequest),
            message,
            source: None,
        }
    }

    pub fn wants_escalation(&self) -> bool {
        self.action == Some(ChatAction::EscalateRequest)
    }

    /// The reply text, treating a blank string the same as a missing one.
    pub fn message_text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Correlation data sent alongside an escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationMetadata {
    pub session_id: String,
    pub timestamp: i64,
}

/// Request body for `POST /escalate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub query: String,
    pub metadata: EscalationMetadata,
    pub user_email: String,
}

/// Response body of `POST /escalate`. The backend answers HTTP 200 with
/// `{"status": "error"}` when it cannot relay the escalation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EscalationAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl EscalationAck {
    /// Parses a response body leniently: anything that is not a recognisable
    /// ack counts as an accepted escalation.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn into_result(self) -> Result<(), ChatError> {
        match self.status.as_deref() {
            Some("error") => Err(ChatError::EscalationRejected {
                message: self.message.unwrap_or_else(|| "unspecified".to_string()),
            }),
            _ => Ok(()),
        }
    }
}
