use crate::job::ChunkState;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Input text is empty")]
    EmptyText,

    #[error("Synthesis failed for chunk {index}: {source:#}")]
    SynthesisFailure {
        index: usize,
        /// State of every chunk when the job stopped
        states: Vec<ChunkState>,
        #[source]
        source: anyhow::Error,
    },

    #[error("Sample rate mismatch{}: got {found} Hz, expected {expected} Hz", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    RateMismatch {
        path: Option<PathBuf>,
        found: u32,
        expected: u32,
    },

    #[error("Channel count mismatch: got {found}, expected {expected}")]
    ChannelMismatch { expected: u16, found: u16 },

    #[error("No audio buffers to stitch")]
    EmptyInput,

    #[error("No chunk files found to stitch")]
    NothingToStitch,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::SynthesisFailure { .. } => 2,
            Error::NothingToStitch | Error::EmptyInput => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
