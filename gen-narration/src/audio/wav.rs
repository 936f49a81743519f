//! WAV file reading and writing.

use super::AudioBuffer;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sample encoding used when writing WAV files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WavEncoding {
    /// 16-bit signed PCM. Samples outside [-1, 1] are clamped.
    #[default]
    Pcm16,
    /// 32-bit IEEE float, written unmodified.
    Float32,
}

impl std::fmt::Display for WavEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WavEncoding::Pcm16 => write!(f, "pcm16"),
            WavEncoding::Float32 => write!(f, "float32"),
        }
    }
}

/// Write a buffer to `path`, creating parent directories as needed.
pub fn write_wav(path: &Path, buffer: &AudioBuffer, encoding: WavEncoding) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: match encoding {
            WavEncoding::Pcm16 => 16,
            WavEncoding::Float32 => 32,
        },
        sample_format: match encoding {
            WavEncoding::Pcm16 => hound::SampleFormat::Int,
            WavEncoding::Float32 => hound::SampleFormat::Float,
        },
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    match encoding {
        WavEncoding::Pcm16 => {
            for &sample in &buffer.samples {
                let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round();
                writer.write_sample(scaled as i16)?;
            }
        }
        WavEncoding::Float32 => {
            for &sample in &buffer.samples {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Read a WAV file, normalising integer samples to [-1, 1).
pub fn read_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    AudioBuffer::interleaved(samples, spec.channels, spec.sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_float32_round_trip_is_exact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("a.wav");

        let buffer = AudioBuffer::interleaved(vec![0.5, -0.25, 1.5, -2.0], 2, 24000).unwrap();
        write_wav(&path, &buffer, WavEncoding::Float32).unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read, buffer);
    }

    #[test]
    fn test_pcm16_clamps_and_quantises() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.wav");

        let buffer = AudioBuffer::mono(vec![0.0, 0.5, -0.5, 3.0, -3.0], 24000);
        write_wav(&path, &buffer, WavEncoding::Pcm16).unwrap();

        let read = read_wav(&path).unwrap();
        assert_eq!(read.sample_rate, 24000);
        assert_eq!(read.channels, 1);
        let expected = [0.0, 0.5, -0.5, 1.0, -1.0];
        for (got, want) in read.samples.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{} vs {}", got, want);
        }
    }

    #[test]
    fn test_read_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_wav(&temp_dir.path().join("missing.wav")).is_err());
    }

    #[test]
    fn test_encoding_parses_from_toml() {
        #[derive(Deserialize)]
        struct Holder {
            encoding: WavEncoding,
        }
        let holder: Holder = toml::from_str("encoding = \"float32\"").unwrap();
        assert_eq!(holder.encoding, WavEncoding::Float32);
        assert_eq!(WavEncoding::default().to_string(), "pcm16");
    }
}
