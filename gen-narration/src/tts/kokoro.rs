//! Kokoro TTS backend using PyO3 to embed Python.
//!
//! The pipeline object is created once and reused for every chunk. Each call
//! runs `pipeline(text, voice=...)` and drains the generator it returns;
//! every yielded result carries one audio tensor.

use super::{BackendOptions, SpeechSynthesizer, SynthesisStream, KOKORO_SAMPLE_RATE};
use crate::audio::AudioBuffer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::{Arc, Once};

/// Initialize Python runtime once.
static PYTHON_INIT: Once = Once::new();

/// Kokoro TTS backend using PyO3.
pub struct KokoroSynthesizer {
    /// `kokoro.KPipeline` instance
    pipeline: Arc<Py<PyAny>>,
}

impl KokoroSynthesizer {
    /// Load the Kokoro pipeline.
    pub fn new(options: &BackendOptions) -> Result<Self> {
        PYTHON_INIT.call_once(pyo3::prepare_freethreaded_python);

        let pipeline = Python::with_gil(|py| -> Result<Py<PyAny>> {
            if options.cudnn_benchmark {
                enable_cudnn_benchmark(py);
            }

            let kokoro = py
                .import("kokoro")
                .context("Failed to import kokoro. Install it with `pip install kokoro`.")?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("lang_code", &options.lang_code)?;
            if let Some(device) = &options.device {
                kwargs.set_item("device", device)?;
            }

            let pipeline = kokoro
                .getattr("KPipeline")?
                .call((), Some(&kwargs))
                .context("Failed to create Kokoro pipeline")?;
            Ok(pipeline.unbind())
        })?;

        log::debug!(
            "Kokoro pipeline ready (lang_code={}, device={})",
            options.lang_code,
            options.device.as_deref().unwrap_or("auto")
        );

        Ok(Self {
            pipeline: Arc::new(pipeline),
        })
    }
}

/// Turn on cuDNN autotuning. Missing torch or CUDA is not an error.
fn enable_cudnn_benchmark(py: Python<'_>) {
    let result: PyResult<()> = (|| {
        let torch = py.import("torch")?;
        let cudnn = torch.getattr("backends")?.getattr("cudnn")?;
        cudnn.setattr("benchmark", true)?;
        Ok(())
    })();

    if let Err(e) = result {
        log::debug!("Could not enable cudnn.benchmark: {}", e);
    }
}

/// Run the pipeline synchronously and collect every audio part.
fn generate(pipeline: &Py<PyAny>, text: &str, voice: &str) -> Result<Vec<AudioBuffer>> {
    Python::with_gil(|py| {
        let kwargs = PyDict::new(py);
        kwargs.set_item("voice", voice)?;

        let results = pipeline
            .bind(py)
            .call((text,), Some(&kwargs))
            .context("Kokoro pipeline call failed")?;

        let mut parts = Vec::new();
        for result in results.try_iter()? {
            // Each result unpacks as (graphemes, phonemes, audio).
            let audio = result?.get_item(2)?;
            if audio.is_none() {
                continue;
            }
            parts.push(AudioBuffer::mono(to_samples(&audio)?, KOKORO_SAMPLE_RATE));
        }

        release_memory(py)?;
        Ok(parts)
    })
}

/// Convert a torch tensor or numpy array into flat f32 samples.
fn to_samples(audio: &Bound<'_, PyAny>) -> Result<Vec<f32>> {
    let array = if audio.hasattr("detach")? {
        audio.call_method0("detach")?.call_method0("cpu")?.call_method0("numpy")?
    } else {
        audio.clone()
    };

    let samples: Vec<f32> = array
        .call_method1("astype", ("float32",))?
        .call_method1("reshape", (-1,))?
        .call_method0("tolist")?
        .extract()
        .context("Kokoro returned audio that is not a float array")?;
    Ok(samples)
}

/// Collect garbage and release cached GPU memory between chunks.
fn release_memory(py: Python<'_>) -> Result<()> {
    py.import("gc")?.call_method0("collect")?;

    if let Ok(torch) = py.import("torch") {
        let cuda = torch.getattr("cuda")?;
        if cuda.call_method0("is_available")?.extract::<bool>()? {
            cuda.call_method0("empty_cache")?;
        }
    }
    Ok(())
}

#[async_trait]
impl SpeechSynthesizer for KokoroSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<SynthesisStream> {
        let pipeline = Arc::clone(&self.pipeline);
        let text = text.to_string();
        let voice = voice.to_string();

        // Run in a blocking task to not block the tokio runtime
        let parts = tokio::task::spawn_blocking(move || generate(&pipeline, &text, &voice))
            .await
            .context("Task join error")??;

        Ok(Box::new(parts.into_iter().map(Ok)))
    }

    fn sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    fn name(&self) -> &'static str {
        "kokoro"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kokoro_backend_creation() {
        // Either kokoro is installed in the linked Python, or construction
        // fails with an import hint.
        let options = BackendOptions {
            cudnn_benchmark: false,
            ..BackendOptions::default()
        };
        match KokoroSynthesizer::new(&options) {
            Ok(backend) => assert_eq!(backend.name(), "kokoro"),
            Err(e) => {
                let msg = format!("{:#}", e);
                assert!(msg.contains("kokoro"), "Error should mention kokoro: {}", msg);
            }
        }
    }
}
