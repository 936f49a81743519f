//! Joining per-chunk audio into one buffer, with optional linear crossfade.

use super::AudioBuffer;
use crate::error::{Error, Result};

/// Number of frames a crossfade of `crossfade_ms` spans at `sample_rate`.
///
/// Zero when crossfading is disabled or too short to cover a single frame.
pub fn overlap_frames(sample_rate: u32, crossfade_ms: i64) -> usize {
    if crossfade_ms <= 0 {
        return 0;
    }
    let frames = sample_rate as u128 * crossfade_ms as u128 / 1000;
    usize::try_from(frames).unwrap_or(usize::MAX)
}

/// Concatenate buffers in order.
pub fn stitch(buffers: &[AudioBuffer], sample_rate: u32) -> Result<AudioBuffer> {
    validate(buffers, sample_rate)?;

    let mut out = buffers[0].clone();
    for buffer in &buffers[1..] {
        out.append(buffer)?;
    }
    Ok(out)
}

/// Concatenate buffers, blending each boundary over `crossfade_ms`.
///
/// The last `overlap` frames of the running output are mixed with the first
/// `overlap` frames of the next buffer using linear ramps, so every eligible
/// boundary shortens the result by `overlap` frames. Boundaries where either
/// side is shorter than the overlap are plain-concatenated. Samples are not
/// clipped here.
pub fn stitch_crossfade(
    buffers: &[AudioBuffer],
    sample_rate: u32,
    crossfade_ms: i64,
) -> Result<AudioBuffer> {
    let overlap = overlap_frames(sample_rate, crossfade_ms);
    if overlap == 0 {
        return stitch(buffers, sample_rate);
    }
    validate(buffers, sample_rate)?;

    // Every boundary needs an incoming buffer at least `overlap` frames long.
    let longest = buffers.iter().map(AudioBuffer::frames).max().unwrap_or(0);
    if overlap > longest {
        return stitch(buffers, sample_rate);
    }

    let (fade_in, fade_out) = linear_ramps(overlap);
    let channels = buffers[0].channels as usize;
    let overlap_samples = overlap * channels;

    let mut out = buffers[0].clone();
    for next in &buffers[1..] {
        if out.frames() < overlap || next.frames() < overlap {
            out.append(next)?;
            continue;
        }

        let tail_start = out.samples.len() - overlap_samples;
        let blended: Vec<f32> = out.samples[tail_start..]
            .iter()
            .zip(&next.samples[..overlap_samples])
            .enumerate()
            .map(|(i, (&tail, &head))| {
                let frame = i / channels;
                (tail as f64 * fade_out[frame] + head as f64 * fade_in[frame]) as f32
            })
            .collect();

        out.samples.truncate(tail_start);
        out.samples.extend_from_slice(&blended);
        out.samples.extend_from_slice(&next.samples[overlap_samples..]);
    }

    Ok(out)
}

/// `linspace(0, 1, len)` and its complement.
fn linear_ramps(len: usize) -> (Vec<f64>, Vec<f64>) {
    let fade_in: Vec<f64> = if len == 1 {
        vec![0.0]
    } else {
        (0..len).map(|i| i as f64 / (len - 1) as f64).collect()
    };
    let fade_out = fade_in.iter().map(|w| 1.0 - w).collect();
    (fade_in, fade_out)
}

fn validate(buffers: &[AudioBuffer], sample_rate: u32) -> Result<()> {
    let first = buffers.first().ok_or(Error::EmptyInput)?;

    for buffer in buffers {
        if buffer.sample_rate != sample_rate {
            return Err(Error::RateMismatch {
                path: None,
                found: buffer.sample_rate,
                expected: sample_rate,
            });
        }
        if buffer.channels != first.channels {
            return Err(Error::ChannelMismatch {
                expected: first.channels,
                found: buffer.channels,
            });
        }
    }
    Ok(())
}
