//! Book loading: turn an `.epub` or `.txt` file into per-chapter paragraph
//! texts for the document builder.
//!
//! EPUB chapters are walked in spine order. Inside each chapter the text of
//! the blocks `p`, `div`, `li` and `h1`-`h4` becomes paragraphs in document
//! order. A block owns only the text outside its nested blocks, so nested
//! markup is never read twice and a parent's own text is never lost; text
//! before and after a nested block forms separate paragraphs. Paragraphs
//! whose collapsed text is not longer than the minimum length are dropped;
//! this removes page numbers, navigation crumbs and stray captions. A
//! chapter without any block markup falls back to a plain html2text pass.

use crate::cancellation::CancellationToken;
use crate::error::LoadError;
use crate::progress::BookIdentity;
use crate::text_utils;
use epub::doc::EpubDoc;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p, div, li, h1, h2, h3, h4").expect("block selector is valid")
});

/// Elements whose text is never reading material.
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "head", "title"];

/// Extraction knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Blocks must be strictly longer than this many characters.
    pub min_paragraph_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_paragraph_chars: crate::config::defaults::default_min_paragraph_chars(),
        }
    }
}

/// Raw text of a book, ready for [`crate::document::build`].
#[derive(Debug, Clone)]
pub struct LoadedBook {
    pub identity: BookIdentity,
    pub title: Option<String>,
    /// Paragraph texts per chapter, in reading order.
    pub chapters: Vec<Vec<String>>,
}

impl LoadedBook {
    /// Title from the metadata, else the file name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.identity.name)
    }

    pub fn paragraph_count(&self) -> usize {
        self.chapters.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Epub,
    Text,
}

fn source_kind(path: &Path) -> Result<SourceKind, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "epub" => Ok(SourceKind::Epub),
        "txt" => Ok(SourceKind::Text),
        _ => Err(LoadError::Unsupported { extension }),
    }
}

/// Load a book from disk.
pub fn load_book(
    path: &Path,
    options: ExtractOptions,
    cancel: &CancellationToken,
) -> Result<LoadedBook, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }
    let kind = source_kind(path)?;
    let identity = BookIdentity::from_path(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let book = match kind {
        SourceKind::Text => load_text(path, identity)?,
        SourceKind::Epub => load_epub(path, identity, options, cancel)?,
    };
    info!(
        book = %book.identity,
        chapters = book.chapters.len(),
        paragraphs = book.paragraph_count(),
        "Finished extracting book text"
    );
    Ok(book)
}

fn load_text(path: &Path, identity: BookIdentity) -> Result<LoadedBook, LoadError> {
    info!(path = %path.display(), "Loading plain text content");
    let data = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedBook {
        identity,
        title: None,
        chapters: vec![text_utils::split_paragraphs(&data)],
    })
}

fn load_epub(
    path: &Path,
    identity: BookIdentity,
    options: ExtractOptions,
    cancel: &CancellationToken,
) -> Result<LoadedBook, LoadError> {
    info!(path = %path.display(), "Loading EPUB content");
    let mut doc = EpubDoc::new(path).map_err(|err| LoadError::Archive {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    if doc.get_num_chapters() == 0 {
        return Err(LoadError::EmptySpine);
    }
    let title = doc
        .mdata("title")
        .map(|item| item.value.trim().to_string())
        .filter(|title| !title.is_empty());
    if let Some(title) = &title {
        debug!(title = %title, "EPUB title");
    }

    let mut chapters = Vec::with_capacity(doc.get_num_chapters());
    loop {
        cancel.check_cancelled("spine")?;
        match doc.get_current_str() {
            Some((chapter, _mime)) => {
                let paragraphs = extract_chapter(&chapter, options.min_paragraph_chars);
                debug!(
                    chapter = chapters.len(),
                    paragraphs = paragraphs.len(),
                    "Parsed chapter"
                );
                chapters.push(paragraphs);
            }
            None => {
                warn!(chapter = chapters.len(), "Spine item has no readable content");
                chapters.push(Vec::new());
            }
        }

        if !doc.go_next() {
            break;
        }
    }

    Ok(LoadedBook {
        identity,
        title,
        chapters,
    })
}

/// Paragraph texts of one XHTML chapter.
pub fn extract_chapter(html: &str, min_chars: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    if document.select(&BLOCK_SELECTOR).next().is_none() {
        return extract_unstructured(html, min_chars);
    }

    let mut paragraphs = Vec::new();
    let mut loose = String::new();
    collect_block_text(document.root_element(), false, &mut loose, &mut paragraphs);

    paragraphs
        .into_iter()
        .filter(|text| text.chars().count() > min_chars)
        .collect()
}

/// Walk `element` in document order. Text goes into `run`, the paragraph
/// being built for the innermost enclosing block; a nested block closes the
/// run and collects its own. Text outside every block is ignored.
fn collect_block_text(
    element: ElementRef<'_>,
    inside_block: bool,
    run: &mut String,
    paragraphs: &mut Vec<String>,
) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if inside_block {
                run.push_str(text);
            }
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        if SKIPPED_ELEMENTS.contains(&child.value().name()) {
            continue;
        }
        if BLOCK_SELECTOR.matches(&child) {
            flush_run(run, paragraphs);
            let mut own = String::new();
            collect_block_text(child, true, &mut own, paragraphs);
            flush_run(&mut own, paragraphs);
        } else {
            collect_block_text(child, inside_block, run, paragraphs);
        }
    }
}

fn flush_run(run: &mut String, paragraphs: &mut Vec<String>) {
    let text = text_utils::collapse_whitespace(run);
    run.clear();
    if !text.is_empty() {
        paragraphs.push(text);
    }
}

fn extract_unstructured(html: &str, min_chars: usize) -> Vec<String> {
    let plain = match html2text::from_read(html.as_bytes(), 10_000) {
        Ok(clean) => clean,
        Err(err) => {
            warn!("html2text failed: {err}");
            return Vec::new();
        }
    };
    text_utils::split_paragraphs(&plain)
        .into_iter()
        .map(|paragraph| text_utils::collapse_whitespace(&paragraph))
        .filter(|text| text.chars().count() > min_chars)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "The first paragraph is long enough to keep around.";
    const LONG_B: &str = "A second paragraph that also clears the minimum length.";

    #[test]
    fn keeps_leaf_blocks_in_document_order() {
        let html = format!(
            "<html><body><div><h1>Chapter 1</h1><p>{LONG_A}</p>\
             <ul><li>{LONG_B}</li></ul></div></body></html>"
        );
        let paragraphs = extract_chapter(&html, 30);
        assert_eq!(paragraphs, vec![LONG_A.to_string(), LONG_B.to_string()]);
    }

    #[test]
    fn nested_blocks_are_not_duplicated() {
        let html = format!("<div><div><p>{LONG_A}</p></div></div>");
        assert_eq!(extract_chapter(&html, 30), vec![LONG_A.to_string()]);
    }

    #[test]
    fn parent_text_around_nested_blocks_is_kept_in_order() {
        let before = "Direct narrative text that is clearly long enough to keep.";
        let after = "Closing words of the outer block, also long enough.";
        let html = format!("<body><div>{before}<p>{LONG_A}</p>{after}</div></body>");
        assert_eq!(
            extract_chapter(&html, 30),
            vec![before.to_string(), LONG_A.to_string(), after.to_string()]
        );
    }

    #[test]
    fn list_item_with_sublist_keeps_its_own_text() {
        let html = format!(
            "<ul><li>{LONG_A}<ul><li>{LONG_B}</li></ul></li></ul>"
        );
        assert_eq!(
            extract_chapter(&html, 30),
            vec![LONG_A.to_string(), LONG_B.to_string()]
        );
    }

    #[test]
    fn text_outside_blocks_and_scripts_is_ignored() {
        let html = format!(
            "<html><head><title>A long enough title for the filter here</title></head>\
             <body>Loose body text that sits outside of any block.<p>{LONG_A}</p>\
             <div><script>var longEnoughScriptText = 'never read aloud';</script></div></body></html>"
        );
        assert_eq!(extract_chapter(&html, 30), vec![LONG_A.to_string()]);
    }

    #[test]
    fn collapses_whitespace_and_inline_markup() {
        let html = "<p>  Words   split\n across <em>inline</em> markup and lines here. </p>";
        assert_eq!(
            extract_chapter(html, 30),
            vec!["Words split across inline markup and lines here.".to_string()]
        );
    }

    #[test]
    fn short_blocks_are_dropped() {
        let exactly_thirty = "a".repeat(30);
        let html = format!("<p>{exactly_thirty}</p><p>{LONG_A}</p><p>12</p>");
        assert_eq!(extract_chapter(&html, 30), vec![LONG_A.to_string()]);
        assert_eq!(extract_chapter(&html, 0).len(), 3);
    }

    #[test]
    fn unstructured_chapter_falls_back_to_plain_text() {
        let html = format!("<html><body>{LONG_A}<br/><br/>{LONG_B}</body></html>");
        let paragraphs = extract_chapter(&html, 30);
        assert!(!paragraphs.is_empty());
        assert!(paragraphs.iter().any(|p| p.contains("first paragraph")));
    }

    #[test]
    fn text_files_become_one_chapter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "One two.\nThree.\n\nFour five six.\n").unwrap();
        let book = load_book(&path, ExtractOptions::default(), &CancellationToken::new())
            .expect("text loads");
        assert_eq!(book.chapters.len(), 1);
        assert_eq!(book.chapters[0].len(), 2);
        assert_eq!(book.display_name(), "notes.txt");
    }

    #[test]
    fn rejects_missing_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let missing = dir.path().join("absent.epub");
        assert!(matches!(
            load_book(&missing, ExtractOptions::default(), &cancel),
            Err(LoadError::NotFound(_))
        ));

        let pdf = dir.path().join("book.pdf");
        fs::write(&pdf, "%PDF").unwrap();
        assert!(matches!(
            load_book(&pdf, ExtractOptions::default(), &cancel),
            Err(LoadError::Unsupported { extension }) if extension == "pdf"
        ));
    }

    #[test]
    fn corrupt_epub_is_an_archive_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.epub");
        fs::write(&path, "definitely not a zip archive").unwrap();
        let err = load_book(&path, ExtractOptions::default(), &CancellationToken::new())
            .expect_err("not a zip");
        assert_eq!(err.kind(), "archive");
    }
}
