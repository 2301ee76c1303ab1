//! Immutable document model: containers of paragraphs of words.
//!
//! A [`Document`] is built once per load from the extractor's chapter
//! paragraphs and never changes afterwards. Only the cursor in
//! [`crate::engine`] moves over it.

use crate::boundary::{self, SentenceBoundaries};
use crate::error::LoadError;
use crate::pagination::{self, DEFAULT_PAGE_CHAR_BUDGET};
use crate::text_utils;
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// One whitespace-delimited token of a paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub index: usize,
    pub ends_sentence: bool,
}

/// Ordered words of one paragraph, with lazily computed sentence boundaries.
#[derive(Debug, Clone)]
pub struct Paragraph {
    words: Vec<Word>,
    char_len: usize,
    boundaries: OnceCell<SentenceBoundaries>,
}

impl Paragraph {
    /// Tokenize `text` into words. Whitespace-only text yields an empty
    /// paragraph; the builder drops those, hand-built documents may not.
    pub fn from_text(text: &str) -> Self {
        let collapsed = text_utils::collapse_whitespace(text);
        let words = text_utils::split_words(&collapsed)
            .into_iter()
            .enumerate()
            .map(|(index, token)| Word {
                text: token.to_string(),
                index,
                ends_sentence: text_utils::ends_sentence(token),
            })
            .collect();
        Self {
            words,
            char_len: collapsed.chars().count(),
            boundaries: OnceCell::new(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn last_word_index(&self) -> Option<usize> {
        self.words.len().checked_sub(1)
    }

    /// Character count of the whitespace-collapsed text.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Sentence partition, computed on first use.
    pub fn boundaries(&self) -> &SentenceBoundaries {
        self.boundaries.get_or_init(|| boundary::analyze(&self.words))
    }

    /// Words `start..=end` joined by single spaces.
    pub fn text_range(&self, start: usize, end: usize) -> String {
        if self.words.is_empty() || start > end {
            return String::new();
        }
        let end = end.min(self.words.len() - 1);
        self.words[start.min(end)..=end]
            .iter()
            .map(|word| word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A top-level navigable unit: a chapter or a char-budgeted page.
#[derive(Debug, Clone)]
pub struct Container {
    paragraphs: Vec<Paragraph>,
    chapter_index: usize,
}

impl Container {
    pub fn new(paragraphs: Vec<Paragraph>, chapter_index: usize) -> Self {
        Self {
            paragraphs,
            chapter_index,
        }
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, idx: usize) -> Option<&Paragraph> {
        self.paragraphs.get(idx)
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Spine chapter this container starts in.
    pub fn chapter_index(&self) -> usize {
        self.chapter_index
    }

    pub fn word_count(&self) -> usize {
        self.paragraphs.iter().map(Paragraph::len).sum()
    }
}

/// The whole book in reading order.
#[derive(Debug, Clone, Default)]
pub struct Document {
    containers: Vec<Container>,
}

impl Document {
    pub fn new(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, idx: usize) -> Option<&Container> {
        self.containers.get(idx)
    }

    pub fn paragraph(&self, container: usize, paragraph: usize) -> Option<&Paragraph> {
        self.containers.get(container)?.paragraph(paragraph)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.containers.iter().map(Container::word_count).sum()
    }

    pub fn paragraph_count(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }
}

/// How paragraphs are grouped into containers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One container per spine chapter.
    Chapter,
    /// Consecutive paragraphs packed up to a character budget.
    #[default]
    Page,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Layout::Chapter => "chapter",
            Layout::Page => "page",
        };
        write!(f, "{}", label)
    }
}

/// Builder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    pub layout: Layout,
    pub page_char_budget: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            layout: Layout::Page,
            page_char_budget: DEFAULT_PAGE_CHAR_BUDGET,
        }
    }
}

/// Build a document from extracted chapters, each a list of paragraph texts.
///
/// Paragraphs that tokenize to nothing and chapters left without
/// paragraphs are dropped; if nothing remains the load fails.
pub fn build(raw_chapters: &[Vec<String>], options: BuildOptions) -> Result<Document, LoadError> {
    let chapters: Vec<(usize, Vec<Paragraph>)> = raw_chapters
        .iter()
        .enumerate()
        .map(|(chapter_idx, texts)| {
            let paragraphs = texts
                .iter()
                .map(|text| Paragraph::from_text(text))
                .filter(|paragraph| !paragraph.is_empty())
                .collect::<Vec<_>>();
            (chapter_idx, paragraphs)
        })
        .filter(|(_, paragraphs)| !paragraphs.is_empty())
        .collect();

    if chapters.is_empty() {
        return Err(LoadError::EmptyDocument);
    }

    let containers = match options.layout {
        Layout::Chapter => chapters
            .into_iter()
            .map(|(chapter_idx, paragraphs)| Container::new(paragraphs, chapter_idx))
            .collect::<Vec<_>>(),
        Layout::Page => {
            let flat = chapters
                .into_iter()
                .flat_map(|(chapter_idx, paragraphs)| {
                    paragraphs.into_iter().map(move |p| (chapter_idx, p))
                })
                .collect::<Vec<_>>();
            let lengths = flat.iter().map(|(_, p)| p.char_len()).collect::<Vec<_>>();
            let groups = pagination::pack_by_char_budget(&lengths, options.page_char_budget);
            let mut items = flat.into_iter();
            groups
                .into_iter()
                .map(|count| {
                    let page = items.by_ref().take(count).collect::<Vec<_>>();
                    let chapter_idx = page.first().map(|(chapter, _)| *chapter).unwrap_or(0);
                    let paragraphs = page.into_iter().map(|(_, p)| p).collect();
                    Container::new(paragraphs, chapter_idx)
                })
                .collect::<Vec<_>>()
        }
    };

    let document = Document::new(containers);
    debug!(
        layout = %options.layout,
        budget = options.page_char_budget,
        "Packed paragraphs into containers"
    );
    info!(
        containers = document.len(),
        paragraphs = document.paragraph_count(),
        words = document.word_count(),
        "Built document model"
    );
    Ok(document)
}
