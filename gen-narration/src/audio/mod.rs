//! Audio buffers, WAV I/O and chunk stitching.

pub mod stitcher;
pub mod wav;

pub use stitcher::stitch_crossfade;
pub use wav::{read_wav, write_wav, WavEncoding};

use crate::error::{Error, Result};

/// Interleaved (channels-last) samples at a fixed sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a mono buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: 1,
            sample_rate,
        }
    }

    /// Create a buffer from interleaved samples.
    pub fn interleaved(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(Error::InvalidArgument(
                "audio buffer needs at least one channel".to_string(),
            ));
        }
        if samples.len() % channels as usize != 0 {
            return Err(Error::InvalidArgument(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Length in frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Append another buffer along the time axis.
    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        if other.channels != self.channels {
            return Err(Error::ChannelMismatch {
                expected: self.channels,
                found: other.channels,
            });
        }
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_and_duration() {
        let buf = AudioBuffer::interleaved(vec![0.0; 48], 2, 24).unwrap();
        assert_eq!(buf.frames(), 24);
        assert!((buf.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_interleaved_rejects_ragged_samples() {
        assert!(AudioBuffer::interleaved(vec![0.0; 3], 2, 24000).is_err());
        assert!(AudioBuffer::interleaved(vec![0.0; 4], 0, 24000).is_err());
    }

    #[test]
    fn test_append_checks_channels() {
        let mut a = AudioBuffer::mono(vec![0.1, 0.2], 24000);
        a.append(&AudioBuffer::mono(vec![0.3], 24000)).unwrap();
        assert_eq!(a.samples, vec![0.1, 0.2, 0.3]);

        let stereo = AudioBuffer::interleaved(vec![0.0, 0.0], 2, 24000).unwrap();
        assert!(matches!(
            a.append(&stereo),
            Err(Error::ChannelMismatch { expected: 1, found: 2 })
        ));
    }
}
