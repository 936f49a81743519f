//! Text processing for TTS: sentence splitting and chunking.

pub mod chunker;
pub mod sentences;

pub use chunker::{chunk_text, DEFAULT_CHUNK_SIZE};
