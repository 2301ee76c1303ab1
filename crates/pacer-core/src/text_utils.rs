//! Text splitting helpers shared by the extractor and the document builder.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// A word ends a sentence when its last significant character is terminal
/// punctuation; closing quotes and brackets after it are allowed.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…]["'”’»)\]]*$"#).expect("sentence terminator pattern is valid")
});

/// Whether `word` terminates a sentence.
pub fn ends_sentence(word: &str) -> bool {
    SENTENCE_END.is_match(word)
}

/// NFC-normalize and collapse every whitespace run into a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let normalized: String = text.nfc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split `text` on whitespace runs, discarding empty tokens.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split text into paragraphs separated by blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut buffer = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !buffer.is_empty() {
                paragraphs.push(buffer.join("\n"));
                buffer.clear();
            }
        } else {
            buffer.push(line);
        }
    }

    if !buffer.is_empty() {
        paragraphs.push(buffer.join("\n"));
    }

    paragraphs
}
