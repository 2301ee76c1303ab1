//! Sentence boundary analysis for a single paragraph.
//!
//! The pacing engine never lets a highlighted chunk run past the end of a
//! sentence, so every paragraph is partitioned into sentences up front. The
//! result is a pure function of the words and is cached on the paragraph.

use crate::document::Word;

/// Sentence partition of one paragraph.
///
/// `starts` and `ends` have equal length; together they cover
/// `[0, words.len())` with no gaps or overlaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SentenceBoundaries {
    pub starts: Vec<usize>,
    pub ends: Vec<usize>,
}

impl SentenceBoundaries {
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Index of the sentence containing `word_idx`, if any.
    pub fn sentence_of(&self, word_idx: usize) -> Option<usize> {
        if self.starts.is_empty() {
            return None;
        }
        let after = self.starts.partition_point(|start| *start <= word_idx);
        let sentence = after.checked_sub(1)?;
        (word_idx <= self.ends[sentence]).then_some(sentence)
    }

    /// Last word index of the sentence containing `word_idx`.
    pub fn sentence_end_for(&self, word_idx: usize) -> Option<usize> {
        self.sentence_of(word_idx).map(|sentence| self.ends[sentence])
    }

    /// First word index of the sentence following `sentence`.
    pub fn next_start(&self, sentence: usize) -> Option<usize> {
        self.starts.get(sentence + 1).copied()
    }
}

/// Compute sentence starts and ends for a paragraph's words.
pub fn analyze(words: &[Word]) -> SentenceBoundaries {
    let mut boundaries = SentenceBoundaries::default();
    if words.is_empty() {
        return boundaries;
    }

    let last = words.len() - 1;
    boundaries.starts.push(0);
    for (idx, word) in words.iter().enumerate() {
        if !word.ends_sentence {
            continue;
        }
        boundaries.ends.push(idx);
        if idx < last {
            boundaries.starts.push(idx + 1);
        }
    }

    // Trailing words after the final terminator form an unterminated sentence.
    if boundaries.ends.len() < boundaries.starts.len() {
        boundaries.ends.push(last);
    }

    boundaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Paragraph;

    fn boundaries_for(text: &str) -> SentenceBoundaries {
        analyze(Paragraph::from_text(text).words())
    }

    fn assert_partition(boundaries: &SentenceBoundaries, len: usize) {
        assert_eq!(boundaries.starts.len(), boundaries.ends.len());
        let mut expected_start = 0;
        for (start, end) in boundaries.starts.iter().zip(&boundaries.ends) {
            assert_eq!(*start, expected_start, "gap or overlap before {start}");
            assert!(start <= end);
            expected_start = end + 1;
        }
        assert_eq!(expected_start, len);
    }

    #[test]
    fn splits_two_sentences() {
        let boundaries = boundaries_for("Hello world. Bye now.");
        assert_eq!(boundaries.starts, vec![0, 2]);
        assert_eq!(boundaries.ends, vec![1, 3]);
    }

    #[test]
    fn paragraph_without_punctuation_is_one_sentence() {
        let boundaries = boundaries_for("no stops in this one at all");
        assert_eq!(boundaries.starts, vec![0]);
        assert_eq!(boundaries.ends, vec![6]);
    }

    #[test]
    fn force_closes_trailing_fragment() {
        let boundaries = boundaries_for("First one. then a fragment");
        assert_eq!(boundaries.starts, vec![0, 2]);
        assert_eq!(boundaries.ends, vec![1, 4]);
    }

    #[test]
    fn consecutive_terminators_make_single_word_sentences() {
        let boundaries = boundaries_for("Oh! Ah! Right.");
        assert_eq!(boundaries.starts, vec![0, 1, 2]);
        assert_eq!(boundaries.ends, vec![0, 1, 2]);
    }

    #[test]
    fn empty_words_give_empty_boundaries() {
        let boundaries = analyze(&[]);
        assert!(boundaries.is_empty());
        assert_eq!(boundaries.sentence_of(0), None);
    }

    #[test]
    fn boundaries_always_partition_the_paragraph() {
        let samples = [
            "One.",
            "word",
            "A b c. D e f! G h i? J k",
            "Wait… what? \"Yes.\" she said. Fine",
            "Trailing spaces.   ",
            "x. y. z.",
        ];
        for sample in samples {
            let paragraph = Paragraph::from_text(sample);
            assert_partition(&analyze(paragraph.words()), paragraph.len());
        }
    }

    #[test]
    fn locates_sentence_for_word() {
        let boundaries = boundaries_for("A b c. D e. F");
        assert_eq!(boundaries.sentence_of(0), Some(0));
        assert_eq!(boundaries.sentence_of(2), Some(0));
        assert_eq!(boundaries.sentence_of(3), Some(1));
        assert_eq!(boundaries.sentence_of(5), Some(2));
        assert_eq!(boundaries.sentence_of(6), None);
        assert_eq!(boundaries.sentence_end_for(3), Some(4));
        assert_eq!(boundaries.next_start(0), Some(3));
        assert_eq!(boundaries.next_start(2), None);
    }
}
