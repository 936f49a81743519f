//! Sentence segmentation policies.

use regex::Regex;
use std::sync::OnceLock;

/// Splits text into trimmed, non-empty sentences in source order.
pub trait SentenceSplitter {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Whitespace following a sentence terminator.
static SENTENCE_END: OnceLock<Regex> = OnceLock::new();

fn sentence_end() -> &'static Regex {
    SENTENCE_END.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence boundary regex is valid"))
}

/// Splits after any run of whitespace that follows `.`, `!` or `?`.
///
/// ASCII terminators only: text using other conventions (`。`, `¿`, ...)
/// comes back as one long sentence.
#[derive(Debug, Default, Clone, Copy)]
pub struct PunctuationSplitter;

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;

        for m in sentence_end().find_iter(text) {
            // Terminators are single-byte, so the sentence keeps its punctuation.
            push_fragment(&mut sentences, &text[start..m.start() + 1]);
            start = m.end();
        }
        push_fragment(&mut sentences, &text[start..]);

        sentences
    }
}

fn push_fragment(sentences: &mut Vec<String>, fragment: &str) {
    let fragment = fragment.trim();
    if !fragment.is_empty() {
        sentences.push(fragment.to_string());
    }
}
