//! Session controller for the support chat client.
//!
//! The controller owns the transcript, talks to the support backend through
//! [`backend::SupportBackend`], and snapshots every change through
//! [`db::TranscriptStore`]. Hosts provide both collaborators; the browser
//! implementations live in the `frontend` crate.

pub mod backend;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod models;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::SupportBackend;
pub use config::ChatConfig;
pub use db::{MemoryTranscriptStore, TranscriptStore};
pub use email::{extract_email, UNKNOWN_EMAIL};
pub use errors::ChatError;
pub use models::{ChatReply, Message, MessageRole};
pub use service::{
    EscalationOutcome, EscalationStage, SessionController, SessionSnapshot, TurnOutcome,
};
