pub mod transcript_store;

pub use transcript_store::{decode_transcript, encode_transcript, MemoryTranscriptStore, TranscriptStore};
