//! Resumable, fail-stop synthesis of a chunked text.
//!
//! Every chunk maps to a deterministic file. A chunk whose file already
//! exists is treated as done, so re-running a job after a failure picks up
//! at the first missing chunk. The first failure stops the job before any
//! later chunk is attempted and before anything is stitched or deleted.
//!
//! Completion is judged by file existence alone: a chunk file truncated by a
//! crash mid-write is reused as if it were complete.

use super::{ChunkPlan, ChunkState, JobPaths, JobPhase, JobProgress, JobReport};
use crate::audio::{read_wav, stitch_crossfade, write_wav, WavEncoding};
use crate::error::{Error, Result};
use crate::tts::{collect_segments, SpeechSynthesizer, KOKORO_SAMPLE_RATE};
use std::path::{Path, PathBuf};

/// Per-job settings.
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Voice identifier passed to the backend
    pub voice: String,
    /// Sample rate every chunk and the final output are written at
    pub sample_rate: u32,
    /// Crossfade between chunks in milliseconds (<= 0 disables it)
    pub crossfade_ms: i64,
    /// Leave chunk files on disk after stitching
    pub keep_chunks: bool,
    /// Reuse chunk files left by earlier runs
    pub resume: bool,
    /// Encoding for chunk files and the final output
    pub encoding: WavEncoding,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            voice: "af_heart".to_string(),
            sample_rate: KOKORO_SAMPLE_RATE,
            crossfade_ms: 30,
            keep_chunks: false,
            resume: true,
            encoding: WavEncoding::default(),
        }
    }
}

/// Drives a backend over a job's chunks, one at a time.
pub struct Orchestrator<'a> {
    backend: &'a dyn SpeechSynthesizer,
    options: JobOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(backend: &'a dyn SpeechSynthesizer, options: JobOptions) -> Self {
        Self { backend, options }
    }

    /// Synthesize missing chunks, stitch them and clean up.
    ///
    /// Returns `Error::SynthesisFailure` for the first chunk that fails;
    /// chunk files written before it stay on disk for the next run.
    pub async fn run<F>(
        &self,
        chunks: &[String],
        paths: &JobPaths,
        mut on_progress: F,
    ) -> Result<JobReport>
    where
        F: FnMut(JobProgress),
    {
        std::fs::create_dir_all(paths.out_dir())?;

        if self.backend.sample_rate() != self.options.sample_rate {
            log::warn!(
                "{} backend produces {} Hz audio but the job writes {} Hz",
                self.backend.name(),
                self.backend.sample_rate(),
                self.options.sample_rate
            );
        }

        let total = chunks.len();
        let mut states = vec![ChunkState::Pending; total];
        let mut synthesized = Vec::new();
        let mut skipped = Vec::new();

        for (index, text) in chunks.iter().enumerate() {
            let chunk_path = paths.chunk_path(index);

            let phase = if self.options.resume && chunk_path.exists() {
                log::info!("Skipping existing chunk {} -> {}", index, chunk_path.display());
                skipped.push(index);
                JobPhase::Skipped
            } else {
                log::info!(
                    "Synthesizing chunk {}/{} ({} chars)",
                    index + 1,
                    total,
                    text.chars().count()
                );
                if let Err(source) = self.synthesize_chunk(text, &chunk_path).await {
                    states[index] = ChunkState::Failed;
                    log::error!("Error synthesizing chunk {}: {:#}", index, source);
                    log::error!("Stopping; re-run the same command to resume from chunk {}", index);
                    return Err(Error::SynthesisFailure {
                        index,
                        states,
                        source,
                    });
                }
                synthesized.push(index);
                JobPhase::Synthesized
            };

            states[index] = ChunkState::Persisted;
            on_progress(JobProgress {
                index,
                total,
                done: index + 1,
                phase,
            });
        }

        let existing: Vec<PathBuf> = (0..total)
            .map(|index| paths.chunk_path(index))
            .filter(|path| path.exists())
            .collect();

        if existing.is_empty() {
            return Err(Error::NothingToStitch);
        }

        on_progress(JobProgress {
            index: total,
            total,
            done: total,
            phase: JobPhase::Stitching,
        });

        let output = paths.output_path();
        log::info!("Stitching {} chunks -> {}", existing.len(), output.display());
        let output_frames = self.stitch_files(&existing, &output)?;
        log::info!("Done. Output: {}", output.display());

        let (removed, cleanup_failures) = if self.options.keep_chunks {
            (Vec::new(), Vec::new())
        } else {
            on_progress(JobProgress {
                index: total,
                total,
                done: total,
                phase: JobPhase::Cleaning,
            });
            remove_chunks(&existing)
        };

        Ok(JobReport {
            states,
            synthesized,
            skipped,
            stitched: existing,
            output,
            output_frames,
            sample_rate: self.options.sample_rate,
            removed,
            cleanup_failures,
        })
    }

    /// Synthesize one chunk and write it to `path`.
    async fn synthesize_chunk(&self, text: &str, path: &Path) -> anyhow::Result<()> {
        let stream = self.backend.synthesize(text, &self.options.voice).await?;
        let mut audio = collect_segments(stream)?
            .ok_or_else(|| anyhow::anyhow!("No audio produced by {} backend", self.backend.name()))?;

        log::debug!("Chunk audio: {:.2} s", audio.duration_secs());

        // Written at the job rate whatever the backend reported.
        audio.sample_rate = self.options.sample_rate;

        write_wav(path, &audio, self.options.encoding)?;
        Ok(())
    }

    /// Read, crossfade and write chunk files. Returns the output length in frames.
    fn stitch_files(&self, files: &[PathBuf], output: &Path) -> Result<usize> {
        let sample_rate = self.options.sample_rate;

        let buffers = files
            .iter()
            .map(|path| {
                let buffer = read_wav(path)?;
                if buffer.sample_rate != sample_rate {
                    return Err(Error::RateMismatch {
                        path: Some(path.clone()),
                        found: buffer.sample_rate,
                        expected: sample_rate,
                    });
                }
                Ok(buffer)
            })
            .collect::<Result<Vec<_>>>()?;

        let combined = stitch_crossfade(&buffers, sample_rate, self.options.crossfade_ms)?;
        write_wav(output, &combined, self.options.encoding)?;
        Ok(combined.frames())
    }
}

/// Delete stitched chunk files. Failures are logged and returned, never fatal.
fn remove_chunks(files: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut removed = Vec::new();
    let mut failed = Vec::new();

    for path in files {
        match std::fs::remove_file(path) {
            Ok(()) => {
                log::info!("Removed chunk: {}", path.display());
                removed.push(path.clone());
            }
            Err(e) => {
                log::warn!("Failed to remove {}: {}", path.display(), e);
                failed.push(path.clone());
            }
        }
    }

    (removed, failed)
}

/// Describe what a run would do without synthesizing anything.
pub fn plan(chunks: &[String], paths: &JobPaths) -> Vec<ChunkPlan> {
    chunks
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let path = paths.chunk_path(index);
            ChunkPlan {
                index,
                done: path.exists(),
                chars: text.chars().count(),
                path,
            }
        })
        .collect()
}
