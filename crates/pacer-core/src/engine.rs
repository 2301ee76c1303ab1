//! The pacing engine: a cursor over a [`Document`] that steps through
//! sentence-respecting word chunks.
//!
//! The cursor is the only mutable reading state. Every movement goes
//! through [`PacingEngine`], and the highlighted span is always derived
//! from the cursor, never stored. A chunk never crosses a sentence end: it
//! stops at the full stop even when that makes it shorter than the chunk
//! size.
//!
//! Paragraphs without words cannot come out of the builder, but a
//! hand-built document may contain them; every movement skips them.

use crate::document::{Document, Paragraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Words highlighted per step unless the user picks another size.
pub const DEFAULT_CHUNK_SIZE: usize = 4;
/// Largest selectable chunk.
pub const MAX_CHUNK_SIZE: usize = 16;

/// A location in the document, independent of chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub container_index: usize,
    #[serde(default)]
    pub paragraph_index: usize,
    #[serde(default)]
    pub word_index: usize,
}

impl Position {
    pub fn new(container_index: usize, paragraph_index: usize, word_index: usize) -> Self {
        Self {
            container_index,
            paragraph_index,
            word_index,
        }
    }
}

/// Where the reader is, plus the session-wide chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    container_index: usize,
    paragraph_index: usize,
    word_index: usize,
    chunk_size: usize,
}

impl Cursor {
    fn origin(chunk_size: usize) -> Self {
        Self {
            container_index: 0,
            paragraph_index: 0,
            word_index: 0,
            chunk_size: clamp_chunk_size(chunk_size),
        }
    }

    pub fn container_index(&self) -> usize {
        self.container_index
    }

    pub fn paragraph_index(&self) -> usize {
        self.paragraph_index
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn position(&self) -> Position {
        Position::new(self.container_index, self.paragraph_index, self.word_index)
    }
}

/// The words to paint for the current step, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub container_index: usize,
    pub paragraph_index: usize,
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn contains(&self, paragraph_index: usize, word_index: usize) -> bool {
        self.paragraph_index == paragraph_index && (self.start..=self.end).contains(&word_index)
    }

    pub fn word_count(&self) -> usize {
        self.end - self.start + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    Moved,
    ParagraphAdvanced,
    ContainerAdvanced,
    /// No more containers: the end of the book.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatResult {
    Moved,
    ParagraphRetreated,
    ContainerRetreated,
    /// Already at the first word of the book.
    AtStart,
}

/// Words before the cursor versus words in the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub words_read: usize,
    pub total_words: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total_words == 0 {
            return 0.0;
        }
        self.words_read as f64 * 100.0 / self.total_words as f64
    }
}

fn clamp_chunk_size(size: usize) -> usize {
    size.clamp(1, MAX_CHUNK_SIZE)
}

/// Chunk starts the forward walk produces inside one paragraph.
fn chunk_starts(paragraph: &Paragraph, chunk_size: usize) -> Vec<usize> {
    let Some(last) = paragraph.last_word_index() else {
        return Vec::new();
    };
    let boundaries = paragraph.boundaries();
    let mut starts = Vec::new();
    let mut word = 0usize;
    loop {
        starts.push(word);
        if word >= last {
            break;
        }
        let Some(sentence) = boundaries.sentence_of(word) else {
            break;
        };
        let next = word + chunk_size;
        if next > boundaries.ends[sentence] {
            match boundaries.next_start(sentence) {
                Some(start) => word = start,
                None => break,
            }
        } else {
            word = next;
        }
    }
    starts
}

#[derive(Debug, Clone)]
pub struct PacingEngine {
    document: Document,
    cursor: Cursor,
    /// Words in all containers before each container.
    container_word_offsets: Vec<usize>,
    total_words: usize,
}

impl PacingEngine {
    /// Create an engine positioned at the first word of the book.
    pub fn new(document: Document, chunk_size: usize) -> Self {
        let mut container_word_offsets = Vec::with_capacity(document.len());
        let mut total_words = 0usize;
        for container in document.containers() {
            container_word_offsets.push(total_words);
            total_words += container.word_count();
        }
        let mut engine = Self {
            document,
            cursor: Cursor::origin(chunk_size),
            container_word_offsets,
            total_words,
        };
        engine.reset();
        engine
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn chunk_size(&self) -> usize {
        self.cursor.chunk_size
    }

    pub fn set_chunk_size(&mut self, size: usize) {
        self.cursor.chunk_size = clamp_chunk_size(size);
    }

    pub fn current_paragraph(&self) -> Option<&Paragraph> {
        self.document
            .paragraph(self.cursor.container_index, self.cursor.paragraph_index)
    }

    /// The span to paint for the cursor, clamped into the paragraph.
    pub fn current_highlight(&self) -> Option<HighlightSpan> {
        let paragraph = self.current_paragraph()?;
        let last = paragraph.last_word_index()?;
        let start = self.cursor.word_index.min(last);
        let sentence_end = paragraph
            .boundaries()
            .sentence_end_for(start)
            .unwrap_or(last);
        let end = (start + self.cursor.chunk_size - 1).min(sentence_end);
        Some(HighlightSpan {
            container_index: self.cursor.container_index,
            paragraph_index: self.cursor.paragraph_index,
            start,
            end,
        })
    }

    /// Text of the current chunk.
    pub fn current_chunk_text(&self) -> Option<String> {
        let span = self.current_highlight()?;
        let paragraph = self.current_paragraph()?;
        Some(paragraph.text_range(span.start, span.end))
    }

    /// Move to the start of the next chunk, snapping to the next sentence
    /// when the chunk would cross a sentence end.
    pub fn advance(&mut self) -> AdvanceResult {
        let Some(paragraph) = self.current_paragraph() else {
            return self.enter_next_container_or_paragraph();
        };
        let Some(last) = paragraph.last_word_index() else {
            return self.enter_next_container_or_paragraph();
        };
        let word = self.cursor.word_index.min(last);
        if word >= last {
            return self.enter_next_container_or_paragraph();
        }

        let boundaries = paragraph.boundaries();
        let Some(sentence) = boundaries.sentence_of(word) else {
            return self.enter_next_container_or_paragraph();
        };
        let next = word + self.cursor.chunk_size;
        if next > boundaries.ends[sentence] {
            match boundaries.next_start(sentence) {
                Some(start) => self.cursor.word_index = start,
                None => return self.enter_next_container_or_paragraph(),
            }
        } else {
            self.cursor.word_index = next;
        }
        trace!(word = self.cursor.word_index, "Advanced within paragraph");
        AdvanceResult::Moved
    }

    /// Move to word 0 of the next non-empty paragraph, crossing into the
    /// next container when the current one is exhausted.
    pub fn enter_next_container_or_paragraph(&mut self) -> AdvanceResult {
        let current = self.cursor.container_index;
        let Some((container, paragraph)) = self.find_forward(current, self.cursor.paragraph_index + 1)
        else {
            debug!(container = current, "Reached end of book");
            return AdvanceResult::Finished;
        };
        self.set_position(container, paragraph, 0);
        if container == current {
            AdvanceResult::ParagraphAdvanced
        } else {
            debug!(from = current, to = container, "Entered next container");
            AdvanceResult::ContainerAdvanced
        }
    }

    /// Step back one word; at the start of a paragraph go to the last word
    /// of the previous one.
    pub fn retreat(&mut self) -> RetreatResult {
        if let Some(last) = self.current_paragraph().and_then(Paragraph::last_word_index) {
            let word = self.cursor.word_index.min(last);
            if word > 0 {
                self.cursor.word_index = word - 1;
                return RetreatResult::Moved;
            }
        }
        self.enter_previous_paragraph(|paragraph| paragraph.last_word_index().unwrap_or(0))
    }

    /// Step back to the start of the previous chunk, using the chunk starts
    /// the forward walk would produce.
    pub fn retreat_chunk(&mut self) -> RetreatResult {
        if let Some(paragraph) = self.current_paragraph() {
            if let Some(last) = paragraph.last_word_index() {
                let word = self.cursor.word_index.min(last);
                if word > 0 {
                    let previous = chunk_starts(paragraph, self.cursor.chunk_size)
                        .into_iter()
                        .rev()
                        .find(|start| *start < word)
                        .unwrap_or(0);
                    self.cursor.word_index = previous;
                    return RetreatResult::Moved;
                }
            }
        }
        let chunk_size = self.cursor.chunk_size;
        self.enter_previous_paragraph(|paragraph| {
            chunk_starts(paragraph, chunk_size).last().copied().unwrap_or(0)
        })
    }

    fn enter_previous_paragraph(&mut self, landing: impl Fn(&Paragraph) -> usize) -> RetreatResult {
        let current = self.cursor.container_index;
        let Some((container, paragraph)) =
            self.find_backward_before(current, self.cursor.paragraph_index)
        else {
            return RetreatResult::AtStart;
        };
        let word = self
            .document
            .paragraph(container, paragraph)
            .map(&landing)
            .unwrap_or(0);
        self.set_position(container, paragraph, word);
        if container == current {
            RetreatResult::ParagraphRetreated
        } else {
            RetreatResult::ContainerRetreated
        }
    }

    /// Put the cursor on word 0 of a paragraph, clamping both indices.
    pub fn jump_to_paragraph(&mut self, container_index: usize, paragraph_index: usize) {
        self.jump_to_word(container_index, paragraph_index, 0);
    }

    /// Put the cursor on a specific word, clamping every index.
    pub fn jump_to_word(&mut self, container_index: usize, paragraph_index: usize, word_index: usize) {
        let Some(last_container) = self.document.len().checked_sub(1) else {
            return;
        };
        let container = container_index.min(last_container);
        let paragraph = self
            .document
            .container(container)
            .map(|c| paragraph_index.min(c.len().saturating_sub(1)))
            .unwrap_or(0);

        let target = self
            .document
            .paragraph(container, paragraph)
            .filter(|p| !p.is_empty())
            .map(|_| (container, paragraph));
        match target {
            Some((container, paragraph)) => {
                let last = self
                    .document
                    .paragraph(container, paragraph)
                    .and_then(Paragraph::last_word_index)
                    .unwrap_or(0);
                self.set_position(container, paragraph, word_index.min(last));
            }
            None => {
                let fallback = self
                    .find_forward(container, paragraph)
                    .or_else(|| self.find_backward_before(container, paragraph));
                if let Some((container, paragraph)) = fallback {
                    self.set_position(container, paragraph, 0);
                }
            }
        }
    }

    /// Jump to the first paragraph of the next container.
    pub fn next_container(&mut self) -> bool {
        let next = self.cursor.container_index + 1;
        if next >= self.document.len() {
            return false;
        }
        let before = self.position();
        self.jump_to_paragraph(next, 0);
        self.position() != before
    }

    /// Jump to the first paragraph of the previous container.
    pub fn prev_container(&mut self) -> bool {
        let Some(previous) = self.cursor.container_index.checked_sub(1) else {
            return false;
        };
        let before = self.position();
        self.jump_to_paragraph(previous, 0);
        self.position() != before
    }

    /// Restore a saved position, clamped into the current document.
    pub fn restore(&mut self, position: Position) {
        self.jump_to_word(
            position.container_index,
            position.paragraph_index,
            position.word_index,
        );
    }

    /// Back to the first word of the book.
    pub fn reset(&mut self) {
        self.cursor.container_index = 0;
        self.cursor.paragraph_index = 0;
        self.cursor.word_index = 0;
        if let Some((container, paragraph)) = self.find_forward(0, 0) {
            self.set_position(container, paragraph, 0);
        }
    }

    pub fn progress(&self) -> Progress {
        let container_offset = self
            .container_word_offsets
            .get(self.cursor.container_index)
            .copied()
            .unwrap_or(0);
        let paragraph_offset: usize = self
            .document
            .container(self.cursor.container_index)
            .map(|c| {
                c.paragraphs()
                    .iter()
                    .take(self.cursor.paragraph_index)
                    .map(Paragraph::len)
                    .sum()
            })
            .unwrap_or(0);
        Progress {
            words_read: container_offset + paragraph_offset + self.cursor.word_index,
            total_words: self.total_words,
        }
    }

    fn set_position(&mut self, container: usize, paragraph: usize, word: usize) {
        self.cursor.container_index = container;
        self.cursor.paragraph_index = paragraph;
        self.cursor.word_index = word;
    }

    /// First non-empty paragraph at or after `(container, paragraph)`.
    fn find_forward(&self, container: usize, paragraph: usize) -> Option<(usize, usize)> {
        self.document
            .containers()
            .iter()
            .enumerate()
            .skip(container)
            .find_map(|(c_idx, c)| {
                let from = if c_idx == container { paragraph } else { 0 };
                c.paragraphs()
                    .iter()
                    .enumerate()
                    .skip(from)
                    .find(|(_, p)| !p.is_empty())
                    .map(|(p_idx, _)| (c_idx, p_idx))
            })
    }

    /// Last non-empty paragraph strictly before `(container, paragraph)`.
    fn find_backward_before(&self, container: usize, paragraph: usize) -> Option<(usize, usize)> {
        let containers = self.document.containers();
        let upto = container.min(containers.len().checked_sub(1)?);
        (0..=upto).rev().find_map(|c_idx| {
            let c = &containers[c_idx];
            let limit = if c_idx == container { paragraph.min(c.len()) } else { c.len() };
            (0..limit)
                .rev()
                .find(|p_idx| !c.paragraphs()[*p_idx].is_empty())
                .map(|p_idx| (c_idx, p_idx))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BuildOptions, Container, Layout, build};

    fn engine_for(chapters: &[&[&str]], chunk_size: usize) -> PacingEngine {
        let raw: Vec<Vec<String>> = chapters
            .iter()
            .map(|paragraphs| paragraphs.iter().map(|p| p.to_string()).collect())
            .collect();
        let document = build(
            &raw,
            BuildOptions {
                layout: Layout::Chapter,
                ..BuildOptions::default()
            },
        )
        .expect("test document builds");
        PacingEngine::new(document, chunk_size)
    }

    fn span(engine: &PacingEngine) -> (usize, usize) {
        let span = engine.current_highlight().expect("highlight exists");
        (span.start, span.end)
    }

    #[test]
    fn highlight_stops_at_sentence_end() {
        let mut engine = engine_for(&[&["Hello world. Bye now."]], 4);
        assert_eq!(span(&engine), (0, 1));
        assert_eq!(engine.current_chunk_text().as_deref(), Some("Hello world."));

        engine.jump_to_word(0, 0, 1);
        assert_eq!(engine.advance(), AdvanceResult::Moved);
        assert_eq!(engine.position().word_index, 2);
        assert_eq!(span(&engine), (2, 3));
        assert_eq!(engine.current_chunk_text().as_deref(), Some("Bye now."));
    }

    #[test]
    fn advance_from_sentence_start_snaps_to_next_sentence() {
        let mut engine = engine_for(&[&["Hello world. Bye now."]], 4);
        assert_eq!(engine.advance(), AdvanceResult::Moved);
        assert_eq!(engine.position().word_index, 2);
        assert_eq!(engine.advance(), AdvanceResult::Finished);
        assert_eq!(engine.position().word_index, 2);
    }

    #[test]
    fn exact_chunk_paragraph_finishes_immediately() {
        let mut engine = engine_for(&[&["one two three four"]], 4);
        assert_eq!(span(&engine), (0, 3));
        assert_eq!(engine.advance(), AdvanceResult::Finished);
    }

    #[test]
    fn long_sentence_steps_by_chunk_size() {
        let mut engine = engine_for(&[&["a b c d e f g h i j."]], 4);
        assert_eq!(span(&engine), (0, 3));
        engine.advance();
        assert_eq!(span(&engine), (4, 7));
        engine.advance();
        assert_eq!(span(&engine), (8, 9));
        assert_eq!(engine.advance(), AdvanceResult::Finished);
    }

    #[test]
    fn crosses_paragraph_and_container_edges() {
        let mut engine = engine_for(&[&["One two.", "Three."], &["Four five."]], 4);
        assert_eq!(engine.advance(), AdvanceResult::ParagraphAdvanced);
        assert_eq!(engine.position(), Position::new(0, 1, 0));
        assert_eq!(engine.advance(), AdvanceResult::ContainerAdvanced);
        assert_eq!(engine.position(), Position::new(1, 0, 0));
        assert_eq!(engine.advance(), AdvanceResult::Finished);
    }

    #[test]
    fn single_word_paragraph_is_a_chunk() {
        let mut engine = engine_for(&[&["Alone", "Next one."]], 3);
        assert_eq!(span(&engine), (0, 0));
        assert_eq!(engine.advance(), AdvanceResult::ParagraphAdvanced);
        assert_eq!(span(&engine), (0, 1));
    }

    #[test]
    fn retreat_walks_back_word_by_word_across_edges() {
        let mut engine = engine_for(&[&["a b."], &["c d e."]], 4);
        engine.jump_to_word(1, 0, 1);
        assert_eq!(engine.retreat(), RetreatResult::Moved);
        assert_eq!(engine.position(), Position::new(1, 0, 0));
        assert_eq!(engine.retreat(), RetreatResult::ContainerRetreated);
        assert_eq!(engine.position(), Position::new(0, 0, 1));
        assert_eq!(engine.retreat(), RetreatResult::Moved);
        assert_eq!(engine.retreat(), RetreatResult::AtStart);
        assert_eq!(engine.position(), Position::new(0, 0, 0));
    }

    #[test]
    fn retreat_into_previous_paragraph_lands_on_last_word() {
        let mut engine = engine_for(&[&["a b c.", "d e."]], 2);
        engine.jump_to_paragraph(0, 1);
        assert_eq!(engine.retreat(), RetreatResult::ParagraphRetreated);
        assert_eq!(engine.position(), Position::new(0, 0, 2));
        assert_eq!(span(&engine), (2, 2));
    }

    #[test]
    fn retreat_chunk_mirrors_forward_steps() {
        let mut engine = engine_for(&[&["a b c d e f. g h i j k."], &["x y z."]], 4);
        let mut forward = vec![engine.position()];
        while engine.advance() != AdvanceResult::Finished {
            forward.push(engine.position());
        }
        let mut backward = vec![engine.position()];
        while engine.retreat_chunk() != RetreatResult::AtStart {
            backward.push(engine.position());
        }
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn advance_then_retreat_never_lands_later() {
        let mut engine = engine_for(&[&["a b c. d e f g h.", "i j."], &["k l m n o p."]], 3);
        loop {
            let origin = engine.position();
            if engine.advance() == AdvanceResult::Finished {
                break;
            }
            let next = engine.position();
            assert!(next > origin);
            while engine.position() > origin {
                engine.retreat();
            }
            assert_eq!(engine.position(), origin);
            engine.restore(next);
            assert_eq!(engine.position(), next);
        }
    }

    #[test]
    fn highlight_never_spans_two_sentences() {
        let mut engine = engine_for(
            &[&["Short. A longer sentence runs on here. Yes! No?", "Fragment only"]],
            5,
        );
        loop {
            let span = engine.current_highlight().expect("span exists");
            let paragraph = engine.current_paragraph().expect("paragraph exists");
            let sentence_end = paragraph
                .boundaries()
                .sentence_end_for(span.start)
                .expect("start is inside a sentence");
            assert!(span.end <= sentence_end);
            if engine.advance() == AdvanceResult::Finished {
                break;
            }
        }
    }

    #[test]
    fn advance_reaches_finished_within_word_count() {
        let mut engine = engine_for(
            &[&["One two three. Four.", "Five six seven eight nine ten."], &["Eleven."]],
            1,
        );
        let total = engine.document().word_count();
        let mut finished = false;
        for _ in 0..total {
            let span = engine.current_highlight().expect("cursor stays in bounds");
            let paragraph = engine.current_paragraph().expect("paragraph exists");
            assert!(span.end < paragraph.len());
            if engine.advance() == AdvanceResult::Finished {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }

    #[test]
    fn jump_clamps_out_of_range_indices() {
        let mut engine = engine_for(&[&["a b."], &["c d.", "e f g."]], 4);
        engine.jump_to_paragraph(9, 9);
        assert_eq!(engine.position(), Position::new(1, 1, 0));
        engine.jump_to_word(1, 1, 99);
        assert_eq!(engine.position(), Position::new(1, 1, 2));
        engine.restore(Position::new(0, 5, 5));
        assert_eq!(engine.position(), Position::new(0, 0, 1));
    }

    #[test]
    fn container_navigation_stops_at_ends() {
        let mut engine = engine_for(&[&["a."], &["b."]], 4);
        assert!(!engine.prev_container());
        assert!(engine.next_container());
        assert_eq!(engine.position(), Position::new(1, 0, 0));
        assert!(!engine.next_container());
        assert!(engine.prev_container());
        assert_eq!(engine.position(), Position::new(0, 0, 0));
    }

    #[test]
    fn empty_paragraphs_are_skipped() {
        let document = Document::new(vec![
            Container::new(vec![Paragraph::from_text("   ")], 0),
            Container::new(
                vec![
                    Paragraph::from_text("First words."),
                    Paragraph::from_text(""),
                    Paragraph::from_text("Last."),
                ],
                1,
            ),
        ]);
        let mut engine = PacingEngine::new(document, 4);
        assert_eq!(engine.position(), Position::new(1, 0, 0));
        assert_eq!(engine.advance(), AdvanceResult::ParagraphAdvanced);
        assert_eq!(engine.position(), Position::new(1, 2, 0));
        assert_eq!(engine.retreat(), RetreatResult::ParagraphRetreated);
        assert_eq!(engine.position(), Position::new(1, 0, 1));
        engine.jump_to_paragraph(0, 0);
        assert_eq!(engine.position(), Position::new(1, 0, 0));
        assert_eq!(engine.retreat(), RetreatResult::AtStart);
    }

    #[test]
    fn empty_document_never_panics() {
        let mut engine = PacingEngine::new(Document::default(), 4);
        assert_eq!(engine.current_highlight(), None);
        assert_eq!(engine.advance(), AdvanceResult::Finished);
        assert_eq!(engine.retreat(), RetreatResult::AtStart);
        assert_eq!(engine.retreat_chunk(), RetreatResult::AtStart);
        engine.jump_to_paragraph(3, 3);
        assert!(!engine.next_container());
        assert_eq!(engine.progress().percent(), 0.0);
    }

    #[test]
    fn chunk_size_is_clamped() {
        let mut engine = engine_for(&[&["a b c."]], 0);
        assert_eq!(engine.chunk_size(), 1);
        engine.set_chunk_size(100);
        assert_eq!(engine.chunk_size(), MAX_CHUNK_SIZE);
    }

    #[test]
    fn progress_counts_words_before_cursor() {
        let mut engine = engine_for(&[&["a b c.", "d e."], &["f g h."]], 2);
        engine.jump_to_word(1, 0, 1);
        let progress = engine.progress();
        assert_eq!(progress.words_read, 6);
        assert_eq!(progress.total_words, 8);
        assert!((progress.percent() - 75.0).abs() < f64::EPSILON);
    }
}
