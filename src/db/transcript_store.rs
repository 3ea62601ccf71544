use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::ChatError;
use crate::models::Message;

/// Durable home of the transcript snapshot.
///
/// Implementations are synchronous and best-effort; the controller logs and
/// swallows every error they return.
pub trait TranscriptStore {
    /// Returns the stored transcript, or an empty one when nothing is stored.
    fn load(&self) -> Result<Vec<Message>, ChatError>;

    /// Replaces the stored snapshot.
    fn save(&self, transcript: &[Message]) -> Result<(), ChatError>;

    /// Removes the stored snapshot entirely.
    fn clear(&self) -> Result<(), ChatError>;
}

pub fn encode_transcript(transcript: &[Message]) -> Result<String, ChatError> {
    serde_json::to_string(transcript).map_err(|e| ChatError::Encode(e.to_string()))
}

pub fn decode_transcript(raw: &str) -> Result<Vec<Message>, ChatError> {
    serde_json::from_str(raw).map_err(ChatError::CorruptSnapshot)
}

/// Store backed by a shared in-memory string.
///
/// Clones share the same slot, so a test can drop a controller and build a new
/// one against the same store to simulate a page reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranscriptStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `raw`, as if a previous page had written it.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        let store = Self::new();
        *store.slot.borrow_mut() = Some(raw.into());
        store
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl TranscriptStore for MemoryTranscriptStore {
    fn load(&self) -> Result<Vec<Message>, ChatError> {
        match self.slot.borrow().as_deref() {
            Some(raw) => decode_transcript(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, transcript: &[Message]) -> Result<(), ChatError> {
        let raw = encode_transcript(transcript)?;
        *self.slot.borrow_mut() = Some(raw);
        Ok(())
    }

    fn clear(&self) -> Result<(), ChatError> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;
    use proptest::prelude::*;

    #[test]
    fn empty_store_loads_empty_transcript() {
        let store = MemoryTranscriptStore::new();
        assert!(store.load().unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn clear_removes_snapshot_and_is_idempotent() {
        let store = MemoryTranscriptStore::new();
        store.save(&[Message::user("hi", 1)]).unwrap();
        assert!(!store.is_empty());

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_snapshot_is_reported_as_corrupt() {
        let store = MemoryTranscriptStore::with_raw("{not json");
        let err = store.load().unwrap_err();
        assert!(err.is_persistence());
        assert!(matches!(err, ChatError::CorruptSnapshot(_)));

        let wrong_shape = MemoryTranscriptStore::with_raw(r#"{"messages":[]}"#);
        assert!(wrong_shape.load().is_err());
    }

    #[test]
    fn clones_share_the_slot() {
        let store = MemoryTranscriptStore::new();
        let reloaded = store.clone();
        store.save(&[Message::bot("hello", 3)]).unwrap();
        assert_eq!(reloaded.load().unwrap().len(), 1);
        assert!(reloaded.raw().unwrap().contains(r#""text":"hello""#));
    }

    fn arb_role() -> impl Strategy<Value = MessageRole> {
        prop_oneof![
            Just(MessageRole::User),
            Just(MessageRole::Bot),
            Just(MessageRole::Typing),
            Just(MessageRole::Error),
        ]
    }

    fn arb_message() -> impl Strategy<Value = Message> {
        (
            "[a-f0-9-]{1,36}",
            arb_role(),
            proptest::option::of("\\PC{0,40}"),
            0i64..4_000_000_000_000,
            any::<bool>(),
        )
            .prop_map(|(id, role, text, timestamp, escalate_offered)| Message {
                id,
                role,
                text,
                timestamp,
                escalate_offered,
            })
    }

    proptest! {
        #[test]
        fn save_then_load_round_trips(transcript in proptest::collection::vec(arb_message(), 0..20)) {
            let store = MemoryTranscriptStore::new();
            store.save(&transcript).unwrap();
            prop_assert_eq!(store.load().unwrap(), transcript);
        }
    }
}
