//! Mock synthesizer for testing
//!
//! Produces a quiet sine tone whose length follows the text length, and can
//! be told to fail or return nothing for particular texts.

use super::{SpeechSynthesizer, SynthesisStream};
use crate::audio::AudioBuffer;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// Tone length per input character.
const MS_PER_CHAR: u32 = 10;

pub struct MockSynthesizer {
    sample_rate: u32,
    /// Texts containing one of these fail
    fail_on: Vec<String>,
    /// Texts containing one of these produce no audio
    empty_on: Vec<String>,
    /// Every text passed to synthesize(), in call order
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            fail_on: Vec::new(),
            empty_on: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail any text containing `needle`.
    #[allow(dead_code)]
    pub fn fail_on(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    /// Return an empty stream for any text containing `needle`.
    #[allow(dead_code)]
    pub fn empty_on(mut self, needle: &str) -> Self {
        self.empty_on.push(needle.to_string());
        self
    }

    /// Texts synthesized so far.
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of times synthesize() was called.
    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    fn tone(&self, frames: usize) -> Vec<f32> {
        let step = 2.0 * std::f32::consts::PI * 220.0 / self.sample_rate as f32;
        (0..frames).map(|i| 0.2 * (i as f32 * step).sin()).collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<SynthesisStream> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }

        if self.fail_on.iter().any(|n| text.contains(n.as_str())) {
            anyhow::bail!("mock synthesis failure");
        }
        if self.empty_on.iter().any(|n| text.contains(n.as_str())) {
            return Ok(Box::new(std::iter::empty()));
        }

        let frames_per_char = (self.sample_rate * MS_PER_CHAR / 1000).max(1) as usize;
        let samples = self.tone(text.chars().count().max(1) * frames_per_char);

        // Two parts, like a pipeline that yields per phrase.
        let (first, second) = samples.split_at(samples.len() / 2);
        let parts = vec![
            Ok(AudioBuffer::mono(first.to_vec(), self.sample_rate)),
            Ok(AudioBuffer::mono(second.to_vec(), self.sample_rate)),
        ];
        Ok(Box::new(parts.into_iter()))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::collect_segments;

    #[tokio::test]
    async fn test_mock_length_follows_text() {
        let mock = MockSynthesizer::new(1000);
        let stream = mock.synthesize("abcd", "af_heart").await.unwrap();
        let audio = collect_segments(stream).unwrap().unwrap();
        assert_eq!(audio.frames(), 4 * 10);
        assert_eq!(audio.sample_rate, 1000);
        assert_eq!(mock.calls(), vec!["abcd"]);
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let mock = MockSynthesizer::new(1000).fail_on("bad").empty_on("hollow");
        assert!(mock.synthesize("a bad one", "v").await.is_err());

        let stream = mock.synthesize("a hollow one", "v").await.unwrap();
        assert!(collect_segments(stream).unwrap().is_none());

        assert_eq!(mock.call_count(), 2);
    }
}
