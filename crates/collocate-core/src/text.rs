//! Text processing utilities.
//!
//! Provides line splitting, sentence splitting, and word extraction for the
//! corpus loader, the phrase miner, and the collocation recorder.

use regex::Regex;
use std::sync::LazyLock;

/// A sentence is the shortest run of non-newline text ending in `.`, `!`, or
/// `?` that is followed by whitespace.
static SENTENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?)([.!?])\s").expect("valid regex"));

/// A word is a maximal run of word characters (letters, digits, underscore).
static WORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Normalize raw document text before splitting.
///
/// Trims surrounding whitespace and appends a single space so that a final
/// sentence ending at end-of-file still has whitespace after its terminator.
pub fn normalize_document(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    text.push(' ');
    text
}

/// Split text into its non-empty lines, each trimmed.
pub fn split_lines(text: &str) -> Vec<String> {
    split_lines_at(text)
        .into_iter()
        .map(|(_, line)| line)
        .collect()
}

/// Like [`split_lines`], pairing each line with the byte offset where its
/// untrimmed line begins in `text`.
pub fn split_lines_at(text: &str) -> Vec<(usize, String)> {
    let mut offset = 0;
    let mut lines = Vec::new();
    for raw in text.split_inclusive('\n') {
        let line = raw.trim();
        if !line.is_empty() {
            lines.push((offset, line.to_string()));
        }
        offset += raw.len();
    }
    lines
}

/// Split text into sentences, preserving original case.
///
/// Each sentence keeps its terminating punctuation. Sentences never span a
/// line break, and text after the last terminator is not a sentence.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn split_sentences(text: &str) -> Vec<String> {
    split_sentences_at(text)
        .into_iter()
        .map(|(_, sentence)| sentence)
        .collect()
}

/// Like [`split_sentences`], pairing each sentence with the byte offset where
/// it starts in `text`.
pub fn split_sentences_at(text: &str) -> Vec<(usize, String)> {
    SENTENCE_PATTERN
        .captures_iter(text)
        .map(|caps| {
            let start = caps.get(0).map_or(0, |m| m.start());
            (start, format!("{}{}", &caps[1], &caps[2]))
        })
        .collect()
}

/// Extract words from text in their original case.
pub fn extract_words(text: &str) -> Vec<&str> {
    WORD_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extract case-folded words from text.
pub fn folded_words(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Join `n` words starting at `start` into a canonical phrase.
///
/// Returns `None` when the window would run past the end of `words`.
pub fn phrase_at<S: AsRef<str>>(words: &[S], start: usize, n: usize) -> Option<String> {
    let window = words.get(start..start.checked_add(n)?)?;
    let mut phrase = String::new();
    for (i, word) in window.iter().enumerate() {
        if i > 0 {
            phrase.push(' ');
        }
        phrase.push_str(word.as_ref());
    }
    Some(phrase)
}

/// Number of words in a canonical phrase.
pub fn phrase_len(phrase: &str) -> usize {
    phrase.split(' ').count()
}
