//! Narration jobs: deterministic chunk paths, chunk state and the resumable
//! synthesis loop.

pub mod orchestrator;

pub use orchestrator::{plan, JobOptions, Orchestrator};

use std::path::{Path, PathBuf};

/// Where a job's chunk files and final output live.
#[derive(Debug, Clone)]
pub struct JobPaths {
    out_dir: PathBuf,
    base_name: String,
}

impl JobPaths {
    pub fn new(out_dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            base_name: base_name.into(),
        }
    }

    /// Paths for a job narrating `input_file`.
    pub fn for_input(out_dir: impl Into<PathBuf>, input_file: &Path) -> Self {
        Self::new(out_dir, base_name_for(input_file))
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// `{out_dir}/{base}_chunk_{index:04}.wav`
    pub fn chunk_path(&self, index: usize) -> PathBuf {
        self.out_dir
            .join(format!("{}_chunk_{:04}.wav", self.base_name, index))
    }

    /// `{out_dir}/{base}_audio.wav`
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}_audio.wav", self.base_name))
    }
}

/// File stem of the input, used to name everything the job writes.
pub fn base_name_for(input_file: &Path) -> String {
    input_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "narration".to_string())
}

/// Lifecycle of one chunk within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Not attempted (yet)
    Pending,
    /// Audio file exists on disk
    Persisted,
    /// Synthesis or write failed; the job stopped here
    Failed,
}

/// Phase reported to the progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Chunk already on disk from an earlier run
    Skipped,
    /// Chunk synthesized and written in this run
    Synthesized,
    /// Combining chunk files
    Stitching,
    /// Removing chunk files
    Cleaning,
}

/// Progress information passed to the callback after each step.
#[derive(Debug, Clone)]
pub struct JobProgress {
    /// Chunk this update is about (meaningless for stitching/cleaning)
    pub index: usize,
    /// Total number of chunks in the job
    pub total: usize,
    /// Chunks finished so far (skipped or synthesized)
    pub done: usize,
    pub phase: JobPhase,
}

/// One line of a dry-run plan.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    pub index: usize,
    pub path: PathBuf,
    pub chars: usize,
    /// A file for this chunk already exists and would be reused
    pub done: bool,
}

/// What a completed job did.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// Final state of every chunk, by index
    pub states: Vec<ChunkState>,
    /// Chunks synthesized in this run
    pub synthesized: Vec<usize>,
    /// Chunks reused from an earlier run
    pub skipped: Vec<usize>,
    /// Chunk files that went into the final output, in order
    pub stitched: Vec<PathBuf>,
    /// Final output file
    pub output: PathBuf,
    /// Length of the final output in frames
    pub output_frames: usize,
    /// Sample rate of the final output
    pub sample_rate: u32,
    /// Chunk files deleted after stitching
    pub removed: Vec<PathBuf>,
    /// Chunk files that could not be deleted
    pub cleanup_failures: Vec<PathBuf>,
}

impl JobReport {
    /// Duration of the final output in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.output_frames as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_paths_are_deterministic() {
        let paths = JobPaths::new("out", "book");
        assert_eq!(paths.chunk_path(0), PathBuf::from("out/book_chunk_0000.wav"));
        assert_eq!(paths.chunk_path(42), PathBuf::from("out/book_chunk_0042.wav"));
        assert_eq!(paths.chunk_path(12345), PathBuf::from("out/book_chunk_12345.wav"));
        assert_eq!(paths.output_path(), PathBuf::from("out/book_audio.wav"));
    }

    #[test]
    fn test_paths_for_input_use_file_stem() {
        let paths = JobPaths::for_input("/tmp/narr", Path::new("texts/chapter one.txt"));
        assert_eq!(
            paths.chunk_path(3),
            PathBuf::from("/tmp/narr/chapter one_chunk_0003.wav")
        );
        assert_eq!(base_name_for(Path::new("notes")), "notes");
        assert_eq!(base_name_for(Path::new("archive.tar.gz")), "archive.tar");
    }

    #[test]
    fn test_report_duration() {
        let report = JobReport {
            states: vec![],
            synthesized: vec![],
            skipped: vec![],
            stitched: vec![],
            output: PathBuf::from("out/a_audio.wav"),
            output_frames: 48000,
            sample_rate: 24000,
            removed: vec![],
            cleanup_failures: vec![],
        };
        assert!((report.duration_secs() - 2.0).abs() < 1e-9);
    }
}
