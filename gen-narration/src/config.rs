//! gen-narration configuration management.

use crate::audio::WavEncoding;
use crate::text::DEFAULT_CHUNK_SIZE;
use crate::tts::KOKORO_SAMPLE_RATE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const DEFAULT_VOICE: &str = "af_heart";
const DEFAULT_OUT_DIR: &str = "out";
const DEFAULT_CROSSFADE_MS: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Kokoro voice identifier
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Directory for chunk files and the final output
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Target characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Crossfade between chunks in milliseconds (0 disables)
    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: i64,

    /// Keep chunk files after stitching
    #[serde(default)]
    pub keep_chunks: bool,

    /// Sample rate chunks and output are written at
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// WAV sample encoding (pcm16, float32)
    #[serde(default)]
    pub encoding: WavEncoding,

    /// Kokoro language code
    #[serde(default = "default_lang_code")]
    pub lang_code: String,

    /// Device to use (cuda, cpu, mps). None means auto-detect.
    #[serde(default)]
    pub device: Option<String>,

    /// Enable cuDNN autotuning when running on CUDA
    #[serde(default = "default_cudnn_benchmark")]
    pub cudnn_benchmark: bool,
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_crossfade_ms() -> i64 {
    DEFAULT_CROSSFADE_MS
}

fn default_sample_rate() -> u32 {
    KOKORO_SAMPLE_RATE
}

fn default_lang_code() -> String {
    "a".to_string()
}

fn default_cudnn_benchmark() -> bool {
    true
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            out_dir: default_out_dir(),
            chunk_size: default_chunk_size(),
            crossfade_ms: default_crossfade_ms(),
            keep_chunks: false,
            sample_rate: default_sample_rate(),
            encoding: WavEncoding::default(),
            lang_code: default_lang_code(),
            device: None,
            cudnn_benchmark: default_cudnn_benchmark(),
        }
    }
}

impl NarrationConfig {
    /// Get the config file path: <config_dir>/cli-programs/gen-narration.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cli-programs")
            .join("gen-narration.toml")
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }
}
