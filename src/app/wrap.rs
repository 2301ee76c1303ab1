//! Word-level wrapping of one container for the terminal view.
//!
//! Wrapping is done here rather than by the paragraph widget so every word
//! keeps a known screen cell; mouse clicks map back to a word and the view
//! can scroll the highlighted line into sight.

use pacer_core::document::Paragraph;
use unicode_width::UnicodeWidthStr;

/// One word placed on a wrapped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedWord {
    pub paragraph: usize,
    pub word: usize,
    /// Column of the first character, relative to the text area.
    pub col: u16,
    pub width: u16,
}

/// A rendered row: the words on it, or nothing for a paragraph gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedLine {
    pub words: Vec<PlacedWord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedPage {
    pub lines: Vec<WrappedLine>,
}

impl WrappedPage {
    /// Row holding `(paragraph, word)`, if it was placed.
    pub fn row_of(&self, paragraph: usize, word: usize) -> Option<usize> {
        self.lines.iter().position(|line| {
            line.words
                .iter()
                .any(|placed| placed.paragraph == paragraph && placed.word == word)
        })
    }

    /// Word under a cell, with `row` counted from the first wrapped line.
    pub fn word_at(&self, row: usize, col: u16) -> Option<(usize, usize)> {
        self.lines.get(row)?.words.iter().find_map(|placed| {
            (col >= placed.col && col < placed.col + placed.width)
                .then_some((placed.paragraph, placed.word))
        })
    }
}

/// Terminal cells taken by `text`; wide glyphs count double.
fn display_width(text: &str) -> u16 {
    u16::try_from(UnicodeWidthStr::width(text)).unwrap_or(u16::MAX)
}

/// Greedily wrap `paragraphs` into rows of at most `width` columns, with a
/// blank row between paragraphs. Words wider than a row get a row of their
/// own and are clipped by the widget.
pub fn wrap_paragraphs(paragraphs: &[Paragraph], width: u16) -> WrappedPage {
    let width = width.max(1);
    let mut lines = Vec::new();

    for (p_idx, paragraph) in paragraphs.iter().enumerate() {
        if paragraph.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(WrappedLine::default());
        }
        let mut current = WrappedLine::default();
        let mut col = 0u16;
        for word in paragraph.words() {
            let w = display_width(&word.text);
            let needed = if current.words.is_empty() { w } else { w.saturating_add(1) };
            if !current.words.is_empty() && col.saturating_add(needed) > width {
                lines.push(std::mem::take(&mut current));
                col = 0;
            }
            if !current.words.is_empty() {
                col = col.saturating_add(1);
            }
            current.words.push(PlacedWord {
                paragraph: p_idx,
                word: word.index,
                col,
                width: w,
            });
            col = col.saturating_add(w);
        }
        if !current.words.is_empty() {
            lines.push(current);
        }
    }

    WrappedPage { lines }
}

/// Scroll offset that keeps `target_row` visible, moving as little as
/// possible from `current`.
pub fn scroll_to_show(current: usize, target_row: usize, viewport_rows: usize) -> usize {
    let viewport_rows = viewport_rows.max(1);
    if target_row < current {
        target_row
    } else if target_row >= current + viewport_rows {
        target_row + 1 - viewport_rows
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(texts: &[&str]) -> Vec<Paragraph> {
        texts.iter().map(|text| Paragraph::from_text(text)).collect()
    }

    #[test]
    fn wraps_greedily_with_paragraph_gaps() {
        let page = wrap_paragraphs(&paragraphs(&["aaa bb cccc", "dd"]), 6);
        let rows: Vec<Vec<(usize, usize, u16)>> = page
            .lines
            .iter()
            .map(|line| line.words.iter().map(|w| (w.paragraph, w.word, w.col)).collect())
            .collect();
        assert_eq!(
            rows,
            vec![
                vec![(0, 0, 0), (0, 1, 4)],
                vec![(0, 2, 0)],
                vec![],
                vec![(1, 0, 0)],
            ]
        );
    }

    #[test]
    fn oversized_word_gets_its_own_row() {
        let page = wrap_paragraphs(&paragraphs(&["a extraordinarily b"]), 5);
        assert_eq!(page.lines.len(), 3);
        assert_eq!(page.lines[1].words[0].width, 15);
    }

    #[test]
    fn hit_testing_maps_cells_to_words() {
        let page = wrap_paragraphs(&paragraphs(&["one two three", "four"]), 8);
        assert_eq!(page.word_at(0, 0), Some((0, 0)));
        assert_eq!(page.word_at(0, 5), Some((0, 1)));
        assert_eq!(page.word_at(0, 3), None);
        assert_eq!(page.word_at(1, 2), Some((0, 2)));
        assert_eq!(page.word_at(2, 0), None);
        assert_eq!(page.word_at(3, 1), Some((1, 0)));
        assert_eq!(page.word_at(40, 0), None);
        assert_eq!(page.row_of(1, 0), Some(3));
    }

    #[test]
    fn wide_glyphs_use_their_cell_width() {
        let page = wrap_paragraphs(&paragraphs(&["漢字漢字 ab cd"]), 8);
        let rows: Vec<Vec<(usize, u16, u16)>> = page
            .lines
            .iter()
            .map(|line| line.words.iter().map(|w| (w.word, w.col, w.width)).collect())
            .collect();
        assert_eq!(rows, vec![vec![(0, 0, 8)], vec![(1, 0, 2), (2, 3, 2)]]);
        for line in &page.lines {
            let last = line.words.last().expect("rows are not empty");
            assert!(last.col + last.width <= 8);
        }

        assert_eq!(page.word_at(0, 7), Some((0, 0)));
        assert_eq!(page.word_at(1, 1), Some((0, 1)));
        assert_eq!(page.word_at(1, 3), Some((0, 2)));
        assert_eq!(page.row_of(0, 2), Some(1));
    }

    #[test]
    fn scroll_moves_minimally() {
        assert_eq!(scroll_to_show(0, 3, 10), 0);
        assert_eq!(scroll_to_show(0, 12, 10), 3);
        assert_eq!(scroll_to_show(5, 2, 10), 2);
        assert_eq!(scroll_to_show(5, 14, 10), 5);
    }
}
