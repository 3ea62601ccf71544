//! Mock collaborators for controller tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use tokio::sync::Notify;

use crate::backend::SupportBackend;
use crate::db::{MemoryTranscriptStore, TranscriptStore};
use crate::errors::ChatError;
use crate::models::{ChatReply, ChatRequest, EscalationMetadata, EscalationRequest, Message};

// ============================================================================
// Mock backend
// ============================================================================

/// Backend that replays queued results and records every request.
#[derive(Default)]
pub struct MockBackend {
    replies: RefCell<VecDeque<Result<ChatReply, ChatError>>>,
    escalation_results: RefCell<VecDeque<Result<(), ChatError>>>,
    gate: RefCell<Option<Rc<Notify>>>,
    escalation_gate: RefCell<Option<Rc<Notify>>>,
    pub chat_calls: RefCell<Vec<ChatRequest>>,
    pub escalations: RefCell<Vec<EscalationRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_reply(&self, reply: ChatReply) {
        self.replies.borrow_mut().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: ChatError) {
        self.replies.borrow_mut().push_back(Err(error));
    }

    pub fn queue_escalation_error(&self, error: ChatError) {
        self.escalation_results.borrow_mut().push_back(Err(error));
    }

    /// Makes chat turns wait until the returned handle is notified.
    pub fn hold_replies(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    /// Makes escalations wait until the returned handle is notified.
    pub fn hold_escalations(&self) -> Rc<Notify> {
        let gate = Rc::new(Notify::new());
        *self.escalation_gate.borrow_mut() = Some(Rc::clone(&gate));
        gate
    }

    pub fn chat_call_count(&self) -> usize {
        self.chat_calls.borrow().len()
    }

    pub fn escalation_count(&self) -> usize {
        self.escalations.borrow().len()
    }
}

impl SupportBackend for MockBackend {
    async fn send_chat_turn(
        &self,
        session_id: &str,
        message: &str,
        contact_email: Option<&str>,
    ) -> Result<ChatReply, ChatError> {
        self.chat_calls.borrow_mut().push(ChatRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
            user_email: contact_email.map(str::to_string),
        });
        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::Network("No mock response queued".into())))
    }

    async fn send_escalation(
        &self,
        query: &str,
        metadata: &EscalationMetadata,
        user_email: &str,
    ) -> Result<(), ChatError> {
        self.escalations.borrow_mut().push(EscalationRequest {
            query: query.to_string(),
            metadata: metadata.clone(),
            user_email: user_email.to_string(),
        });
        let gate = self.escalation_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.escalation_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }
}

// ============================================================================
// Recording store
// ============================================================================

/// Memory store that counts writes and can be told to fail them.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryTranscriptStore,
    saves: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TranscriptStore for RecordingStore {
    fn load(&self) -> Result<Vec<Message>, ChatError> {
        self.inner.load()
    }

    fn save(&self, transcript: &[Message]) -> Result<(), ChatError> {
        self.saves.set(self.saves.get() + 1);
        if self.fail_writes.get() {
            return Err(ChatError::StorageWrite("quota exceeded".into()));
        }
        self.inner.save(transcript)
    }

    fn clear(&self) -> Result<(), ChatError> {
        if self.fail_writes.get() {
            return Err(ChatError::StorageWrite("quota exceeded".into()));
        }
        self.inner.clear()
    }
}
