use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::SupportBackend;
use crate::db::TranscriptStore;
use crate::email::extract_email_or_unknown;
use crate::errors::ChatError;
use crate::models::{validate_message, ChatReply, EscalationMetadata, Message};

pub const ESCALATION_PROMPT: &str = "I couldn't find an answer. Would you like to escalate?";
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";
pub const CONNECTION_ERROR: &str = "Error connecting to server. Please try again later.";
pub const ESCALATION_DECLINED: &str = "Okay — no escalation. How else can I help?";
pub const ESCALATION_CANCELLED: &str = "No details provided. Escalation cancelled.";
pub const ESCALATION_ACKNOWLEDGED: &str =
    "Thanks — escalating now. Support will contact you soon.";
pub const ESCALATION_FAILED: &str = "Failed to send escalation — please try again later.";

/// Where the escalation sub-protocol currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscalationStage {
    #[default]
    Idle,
    /// The user consented; the presentation layer is collecting query + contact.
    AwaitingDetails,
    /// The escalation request is on the wire.
    Submitting,
}

/// Result of [`SessionController::send_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another turn is still in flight; nothing happened.
    Busy,
    Answered { escalate_offered: bool },
    /// The backend could not be reached; an error entry was appended.
    Failed,
}

/// Result of the escalation entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    Declined,
    AwaitingDetails,
    Cancelled,
    Sent,
    Failed,
    /// `complete_escalation` was called without a preceding consent.
    NotRequested,
    /// An escalation is already being submitted.
    Busy,
}

/// Read-only view of the session handed to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub transcript: Vec<Message>,
    pub loading: bool,
    pub escalation: EscalationStage,
}

pub type SubscriptionId = u64;

type Listener = Rc<dyn Fn(&SessionSnapshot)>;

#[derive(Debug, Default)]
struct SessionState {
    transcript: Vec<Message>,
    loading: bool,
    typing_id: Option<String>,
    escalation: EscalationStage,
    last_timestamp: i64,
}

impl SessionState {
    /// Wall-clock millis, never earlier than the last value handed out.
    fn next_timestamp(&mut self) -> i64 {
        self.last_timestamp = self.last_timestamp.max(Utc::now().timestamp_millis());
        self.last_timestamp
    }

    /// Appends `message`, keeping a live typing placeholder in last position.
    fn push(&mut self, message: Message) {
        match self.transcript.last() {
            Some(last) if last.is_typing() => {
                let at = self.transcript.len() - 1;
                self.transcript.insert(at, message);
            }
            _ => self.transcript.push(message),
        }
    }

    fn remove_typing(&mut self) -> bool {
        let Some(id) = self.typing_id.take() else {
            return false;
        };
        let before = self.transcript.len();
        self.transcript.retain(|m| m.id != id);
        self.transcript.len() != before
    }
}

#[derive(Debug, Clone, Copy)]
enum Flight {
    Turn,
    Escalation,
}

/// Ends an in-flight operation when dropped, including when the owning future
/// is dropped before the backend answers.
struct InFlight<'a, B: SupportBackend, S: TranscriptStore> {
    controller: &'a SessionController<B, S>,
    flight: Flight,
}

impl<B: SupportBackend, S: TranscriptStore> Drop for InFlight<'_, B, S> {
    fn drop(&mut self) {
        self.controller.land(self.flight);
    }
}

/// Owns the transcript of one chat session and sequences every change to it.
///
/// All operations take `&self` and run on a single thread. Internal state is
/// never borrowed across an `.await`, so the presentation layer may read the
/// controller (or be notified) while a remote call is pending.
pub struct SessionController<B: SupportBackend, S: TranscriptStore> {
    backend: B,
    store: S,
    session_id: String,
    state: RefCell<SessionState>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_subscription: Cell<SubscriptionId>,
}

impl<B: SupportBackend, S: TranscriptStore> SessionController<B, S> {
    /// Restores the transcript from `store` and starts a fresh session.
    ///
    /// A missing or unreadable snapshot yields an empty transcript. Typing
    /// placeholders left in a snapshot are dropped, since no turn survives a
    /// reload.
    pub fn initialize(backend: B, store: S) -> Self {
        let mut transcript = store.load().unwrap_or_else(|e| {
            warn!("Discarding stored transcript: {e}");
            Vec::new()
        });
        transcript.retain(|m| !m.is_typing());

        let last_timestamp = transcript.iter().map(|m| m.timestamp).max().unwrap_or(0);
        let session_id = format!("sess_{}", Uuid::new_v4().simple());
        info!(
            "Chat session {session_id} started with {} restored messages",
            transcript.len()
        );

        Self {
            backend,
            store,
            session_id,
            state: RefCell::new(SessionState {
                transcript,
                last_timestamp,
                ..SessionState::default()
            }),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> Vec<Message> {
        self.state.borrow().transcript.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn escalation_stage(&self) -> EscalationStage {
        self.state.borrow().escalation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.borrow();
        SessionSnapshot {
            session_id: self.session_id.clone(),
            transcript: state.transcript.clone(),
            loading: state.loading,
            escalation: state.escalation,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers `listener` to receive a snapshot after every state change.
    pub fn subscribe(&self, listener: impl Fn(&SessionSnapshot) + 'static) -> SubscriptionId {
        let id = self.next_subscription.get();
        self.next_subscription.set(id + 1);
        let listener: Listener = Rc::new(listener);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    // ── Chat turns ────────────────────────────────────────────────────────────

    /// Sends one user message and appends the backend's answer (or an error
    /// entry) to the transcript.
    ///
    /// Blank input is ignored. A second turn while one is pending is rejected
    /// with [`TurnOutcome::Busy`].
    pub async fn send_turn(&self, text: &str, contact_email: Option<&str>) -> TurnOutcome {
        if let Err(e) = validate_message(text) {
            debug!("Ignoring turn: {e}");
            return TurnOutcome::Ignored;
        }
        let Some(_flight) = self.start_turn(text) else {
            debug!("Turn rejected: session {} already has one in flight", self.session_id);
            return TurnOutcome::Busy;
        };

        let result = self
            .backend
            .send_chat_turn(&self.session_id, text, contact_email)
            .await;
        self.resolve_turn(result)
    }

    fn start_turn(&self, text: &str) -> Option<InFlight<'_, B, S>> {
        {
            let mut state = self.state.borrow_mut();
            if state.loading {
                return None;
            }
            let timestamp = state.next_timestamp();
            state.push(Message::user(text, timestamp));

            let typing = Message::typing(timestamp);
            state.typing_id = Some(typing.id.clone());
            state.transcript.push(typing);
            state.loading = true;
        }
        self.commit();
        Some(InFlight { controller: self, flight: Flight::Turn })
    }

    fn resolve_turn(&self, result: Result<ChatReply, ChatError>) -> TurnOutcome {
        let outcome = {
            let mut state = self.state.borrow_mut();
            state.remove_typing();
            let timestamp = state.next_timestamp();
            match result {
                Ok(reply) => {
                    debug!(
                        "Session {} answered (action: {:?}, source: {:?})",
                        self.session_id, reply.action, reply.source
                    );
                    let message = reply_message(&reply, timestamp);
                    let escalate_offered = message.escalate_offered;
                    state.push(message);
                    TurnOutcome::Answered { escalate_offered }
                }
                Err(e) => {
                    error!("Chat turn failed for session {}: {e}", self.session_id);
                    state.push(Message::error(CONNECTION_ERROR, timestamp));
                    TurnOutcome::Failed
                }
            }
        };
        self.commit();
        outcome
    }

    // ── Escalation ────────────────────────────────────────────────────────────

    /// One-call form of the escalation protocol.
    ///
    /// With consent and no input yet, the session waits in
    /// [`EscalationStage::AwaitingDetails`] for [`Self::complete_escalation`].
    pub async fn request_escalation(
        &self,
        consent: bool,
        raw_input: Option<&str>,
    ) -> EscalationOutcome {
        match self.begin_escalation(consent) {
            EscalationOutcome::AwaitingDetails if raw_input.is_some() => {
                self.complete_escalation(raw_input).await
            }
            outcome => outcome,
        }
    }

    /// Records the user's answer to an escalation offer.
    pub fn begin_escalation(&self, consent: bool) -> EscalationOutcome {
        {
            let mut state = self.state.borrow_mut();
            if state.escalation == EscalationStage::Submitting {
                debug!("Escalation already being submitted for session {}", self.session_id);
                return EscalationOutcome::Busy;
            }
            if consent {
                state.escalation = EscalationStage::AwaitingDetails;
            } else {
                state.escalation = EscalationStage::Idle;
                let timestamp = state.next_timestamp();
                state.push(Message::bot(ESCALATION_DECLINED, timestamp));
            }
        }

        if consent {
            self.publish();
            EscalationOutcome::AwaitingDetails
        } else {
            self.commit();
            EscalationOutcome::Declined
        }
    }

    /// Submits the details collected after consent. `None` means the user
    /// dismissed the form.
    ///
    /// The contact address is the first email found in `raw_input`, or
    /// `"unknown"`. Failures append a message and are not retried.
    pub async fn complete_escalation(&self, raw_input: Option<&str>) -> EscalationOutcome {
        let pending = {
            let mut state = self.state.borrow_mut();
            match state.escalation {
                EscalationStage::Idle => {
                    debug!("No escalation awaiting details in session {}", self.session_id);
                    return EscalationOutcome::NotRequested;
                }
                EscalationStage::Submitting => return EscalationOutcome::Busy,
                EscalationStage::AwaitingDetails => {}
            }

            let timestamp = state.next_timestamp();
            match raw_input.filter(|input| !input.trim().is_empty()) {
                None => {
                    state.escalation = EscalationStage::Idle;
                    state.push(Message::bot(ESCALATION_CANCELLED, timestamp));
                    None
                }
                Some(input) => {
                    state.escalation = EscalationStage::Submitting;
                    state.push(Message::bot(ESCALATION_ACKNOWLEDGED, timestamp));
                    Some((input, timestamp))
                }
            }
        };
        self.commit();

        let Some((query, timestamp)) = pending else {
            return EscalationOutcome::Cancelled;
        };
        let _flight = InFlight { controller: self, flight: Flight::Escalation };

        let metadata = EscalationMetadata { session_id: self.session_id.clone(), timestamp };
        let user_email = extract_email_or_unknown(query);
        let result = self.backend.send_escalation(query, &metadata, user_email).await;

        match result {
            Ok(()) => {
                info!("Escalation sent for session {} (contact: {user_email})", self.session_id);
                EscalationOutcome::Sent
            }
            Err(e) => {
                error!("Escalation failed for session {}: {e}", self.session_id);
                {
                    let mut state = self.state.borrow_mut();
                    let timestamp = state.next_timestamp();
                    // Error role, not bot: rendered the same as a failed chat turn.
                    state.push(Message::error(ESCALATION_FAILED, timestamp));
                }
                self.commit();
                EscalationOutcome::Failed
            }
        }
    }

    // ── Housekeeping ──────────────────────────────────────────────────────────

    /// Empties the transcript and deletes the stored snapshot. The session id
    /// and any in-flight turn are left alone.
    pub fn clear(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.transcript.clear();
            state.typing_id = None;
            if state.escalation == EscalationStage::AwaitingDetails {
                state.escalation = EscalationStage::Idle;
            }
        }
        if let Err(e) = self.store.clear() {
            warn!("Failed to remove stored transcript for session {}: {e}", self.session_id);
        }
        self.publish();
    }

    fn land(&self, flight: Flight) {
        let abandoned = {
            let mut state = self.state.borrow_mut();
            match flight {
                Flight::Turn => {
                    state.loading = false;
                    state.remove_typing()
                }
                Flight::Escalation => {
                    state.escalation = EscalationStage::Idle;
                    false
                }
            }
        };
        if abandoned {
            warn!("Turn in session {} dropped before the backend answered", self.session_id);
            self.commit();
        } else {
            self.publish();
        }
    }

    /// Persists the transcript, then notifies subscribers.
    fn commit(&self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.store.save(&snapshot.transcript) {
            warn!("Failed to persist transcript for session {}: {e}", self.session_id);
        }
        self.notify(&snapshot);
    }

    /// Notifies subscribers of a change that does not touch the transcript.
    fn publish(&self) {
        let snapshot = self.snapshot();
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &SessionSnapshot) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

/// Builds the bot entry for a successful reply.
fn reply_message(reply: &ChatReply, timestamp: i64) -> Message {
    if reply.wants_escalation() {
        Message::bot(reply.message_text().unwrap_or(ESCALATION_PROMPT), timestamp)
            .offering_escalation()
    } else {
        Message::bot(reply.message_text().unwrap_or(FALLBACK_REPLY), timestamp)
    }
}

#[cfg(test)]
#[path = "session_controller_test.rs"]
mod tests;
