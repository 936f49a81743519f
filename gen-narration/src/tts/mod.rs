//! Speech synthesis backends.

#[cfg(feature = "kokoro")]
pub mod kokoro;
pub mod mock;

pub use mock::MockSynthesizer;

use crate::audio::AudioBuffer;
use anyhow::Result;
use async_trait::async_trait;

/// Sample rate Kokoro produces.
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

/// Audio parts for one synthesis call, in playback order.
///
/// Finite. Restarting means calling the backend again.
pub type SynthesisStream = Box<dyn Iterator<Item = Result<AudioBuffer>> + Send>;

/// A text-to-speech engine.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given voice.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesisStream>;

    /// Sample rate of the audio this backend produces.
    fn sample_rate(&self) -> u32;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Which backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BackendKind {
    /// Kokoro via embedded Python
    Kokoro,
    /// Synthetic tones, for exercising the pipeline without a model
    Mock,
}

/// Backend construction options.
///
/// These are applied once when the backend is created and never touched
/// again during a job.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "kokoro"), allow(dead_code))]
pub struct BackendOptions {
    /// Kokoro language code ("a" = American English, "b" = British English, ...)
    pub lang_code: String,
    /// Device to run on (cuda, cpu, mps). None lets the model pick.
    pub device: Option<String>,
    /// Set `torch.backends.cudnn.benchmark` so cuDNN autotunes kernels for
    /// the input shapes it sees. Speeds up long runs on CUDA, no effect
    /// elsewhere.
    pub cudnn_benchmark: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            lang_code: "a".to_string(),
            device: None,
            cudnn_benchmark: true,
        }
    }
}

/// Create a synthesis backend.
pub fn create_backend(
    kind: BackendKind,
    options: &BackendOptions,
) -> Result<Box<dyn SpeechSynthesizer>> {
    match kind {
        BackendKind::Mock => Ok(Box::new(MockSynthesizer::new(KOKORO_SAMPLE_RATE))),
        #[cfg(feature = "kokoro")]
        BackendKind::Kokoro => Ok(Box::new(kokoro::KokoroSynthesizer::new(options)?)),
        #[cfg(not(feature = "kokoro"))]
        BackendKind::Kokoro => {
            let _ = options;
            anyhow::bail!(
                "This build has no Kokoro backend. Rebuild with `--features kokoro` \
                 (with PYO3_PYTHON pointing at a Python that has kokoro installed)."
            )
        }
    }
}

/// Drain a synthesis stream into one buffer.
///
/// Returns `None` when the backend produced no samples at all.
pub fn collect_segments(stream: SynthesisStream) -> Result<Option<AudioBuffer>> {
    let mut combined: Option<AudioBuffer> = None;

    for part in stream {
        let part = part?;
        match combined.as_mut() {
            None => combined = Some(part),
            Some(buffer) => buffer.append(&part)?,
        }
    }

    Ok(combined.filter(|buffer| !buffer.is_empty()))
}
