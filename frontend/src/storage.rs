use support_chat::db::{decode_transcript, encode_transcript};
use support_chat::{ChatError, Message, TranscriptStore};
use wasm_bindgen::JsValue;

/// Transcript snapshot kept in the browser's `localStorage` under one key.
#[derive(Clone, Debug)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> Result<web_sys::Storage, ChatError> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::StorageUnavailable("window is unavailable".to_string()))?;
        window
            .local_storage()
            .map_err(|e| ChatError::StorageUnavailable(js_error(&e)))?
            .ok_or_else(|| ChatError::StorageUnavailable("local storage is disabled".to_string()))
    }
}

impl TranscriptStore for LocalStorageStore {
    fn load(&self) -> Result<Vec<Message>, ChatError> {
        let raw = self
            .storage()?
            .get_item(&self.key)
            .map_err(|e| ChatError::StorageUnavailable(js_error(&e)))?;
        match raw {
            Some(raw) => decode_transcript(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, transcript: &[Message]) -> Result<(), ChatError> {
        let raw = encode_transcript(transcript)?;
        self.storage()?
            .set_item(&self.key, &raw)
            .map_err(|e| ChatError::StorageWrite(js_error(&e)))
    }

    fn clear(&self) -> Result<(), ChatError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| ChatError::StorageWrite(js_error(&e)))
    }
}

// QuotaExceededError and friends arrive as DOMException values.
fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
