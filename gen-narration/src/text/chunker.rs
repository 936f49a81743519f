//! Text chunking for TTS processing.

use super::sentences::{PunctuationSplitter, SentenceSplitter};
use crate::error::{Error, Result};

/// Default target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Split text into sentence-aware chunks of roughly `chunk_size` characters.
///
/// Sentences are never split, so a single sentence longer than `chunk_size`
/// becomes its own oversized chunk. Sizes are counted in characters.
pub fn chunk_text(text: &str, chunk_size: usize) -> Result<Vec<String>> {
    chunk_text_with(&PunctuationSplitter, text, chunk_size)
}

/// Like [`chunk_text`], with a custom sentence segmentation policy.
pub fn chunk_text_with<S>(splitter: &S, text: &str, chunk_size: usize) -> Result<Vec<String>>
where
    S: SentenceSplitter + ?Sized,
{
    if chunk_size == 0 {
        return Err(Error::InvalidArgument(
            "chunk size must be greater than 0".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    // Includes one separator per sentence already in `current`.
    let mut current_len = 0;

    for sentence in splitter.split(text) {
        let sentence_len = sentence.chars().count();

        if current.is_empty() || current_len + sentence_len <= chunk_size {
            current.push(sentence);
            current_len += sentence_len + 1;
        } else {
            chunks.push(current.join(" ").trim().to_string());
            current = vec![sentence];
            current_len = sentence_len + 1;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" ").trim().to_string());
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_chunk_short_text() {
        let chunks = chunk_text("Hello world. How are you?", 280).unwrap();
        assert_eq!(chunks, vec!["Hello world. How are you?"]);
    }

    #[test]
    fn test_chunk_groups_sentences_greedily() {
        // "Aaaa." is 5 chars; two of them plus a separator is 11.
        let text = "Aaaa. Bbbb. Cccc. Dddd.";
        let chunks = chunk_text(text, 11).unwrap();
        assert_eq!(chunks, vec!["Aaaa. Bbbb.", "Cccc. Dddd."]);

        let chunks = chunk_text(text, 10).unwrap();
        assert_eq!(chunks, vec!["Aaaa.", "Bbbb.", "Cccc.", "Dddd."]);
    }

    #[test]
    fn test_chunk_zero_size_is_invalid() {
        let err = chunk_text("Hello.", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_chunk_oversized_sentence_kept_whole() {
        let long = "This single sentence is far longer than the tiny budget we allow.";
        let text = format!("Hi. {} Bye.", long);
        let chunks = chunk_text(&text, 10).unwrap();
        assert_eq!(chunks, vec!["Hi.", long, "Bye."]);
    }

    #[test]
    fn test_chunk_single_oversized_sentence() {
        let text = "No terminator anywhere in this rather long line of text";
        let chunks = chunk_text(text, 5).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunk_text("", 100).unwrap().is_empty());
        assert!(chunk_text("   \n\n   ", 100).unwrap().is_empty());
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        // Each sentence is 6 chars but 12 bytes.
        let text = "ééééé. ààààà.";
        let chunks = chunk_text(text, 13).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_with_custom_splitter() {
        struct Lines;
        impl SentenceSplitter for Lines {
            fn split(&self, text: &str) -> Vec<String> {
                text.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect()
            }
        }

        let chunks = chunk_text_with(&Lines, "one\ntwo\nthree", 7).unwrap();
        assert_eq!(chunks, vec!["one two", "three"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_text(
            words in prop::collection::vec("[a-zA-Z]{1,8}[.!?]?", 1..60),
            chunk_size in 1usize..200,
        ) {
            let text = words.join(" ");
            let chunks = chunk_text(&text, chunk_size).unwrap();

            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
            prop_assert_eq!(chunks.join(" "), normalize_whitespace(&text));
        }

        #[test]
        fn prop_multi_sentence_chunks_respect_budget(
            words in prop::collection::vec("[a-z]{1,6}\\.", 1..40),
            chunk_size in 1usize..80,
        ) {
            let text = words.join(" ");
            for chunk in chunk_text(&text, chunk_size).unwrap() {
                let sentences = PunctuationSplitter.split(&chunk);
                if sentences.len() > 1 {
                    prop_assert!(chunk.chars().count() <= chunk_size);
                }
            }
        }
    }
}
