use thiserror::Error;

/// Every failure the chat client can observe, grouped the way the controller
/// treats them: validation problems are ignored, transport problems become a
/// transcript message, persistence problems are logged and swallowed.
#[derive(Debug, Error)]
pub enum ChatError {
    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {after_ms} ms")]
    Timeout { after_ms: u32 },

    #[error("Server error: {status}")]
    ServerStatus { status: u16 },

    #[error("Parse error: {0}")]
    Decode(String),

    #[error("Serialize error: {0}")]
    Encode(String),

    #[error("Escalation rejected by backend: {message}")]
    EscalationRejected { message: String },

    // ── Persistence errors ───────────────────────────────────────────────────
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage write failed: {0}")]
    StorageWrite(String),

    #[error("Stored transcript is malformed: {0}")]
    CorruptSnapshot(#[source] serde_json::Error),
}

impl ChatError {
    pub fn empty_field(field_name: impl Into<String>) -> Self {
        ChatError::EmptyField { field_name: field_name.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyField { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::Network(_)
                | ChatError::Timeout { .. }
                | ChatError::ServerStatus { .. }
                | ChatError::Decode(_)
                | ChatError::Encode(_)
                | ChatError::EscalationRejected { .. }
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            ChatError::StorageUnavailable(_)
                | ChatError::StorageWrite(_)
                | ChatError::CorruptSnapshot(_)
        )
    }
}
