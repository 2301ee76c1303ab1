//! Pagination utilities.
//!
//! Pages are built by greedily packing whole paragraphs until the next one
//! would push the page past a character budget. Paragraphs are never split,
//! so a single paragraph longer than the budget becomes a page on its own.

/// Default characters per page.
pub const DEFAULT_PAGE_CHAR_BUDGET: usize = 1500;
/// Smallest accepted page budget.
pub const MIN_PAGE_CHAR_BUDGET: usize = 200;
/// Largest accepted page budget.
pub const MAX_PAGE_CHAR_BUDGET: usize = 20_000;

/// Group consecutive paragraph lengths into pages.
///
/// Returns the number of paragraphs on each page, in order. The counts sum
/// to `lengths.len()` and every page holds at least one paragraph.
pub fn pack_by_char_budget(lengths: &[usize], budget: usize) -> Vec<usize> {
    let mut pages = Vec::new();
    let mut current_count = 0usize;
    let mut current_len = 0usize;

    for &len in lengths {
        if current_count > 0 && current_len + len > budget {
            // Finish the current page and start a new one.
            pages.push(current_count);
            current_count = 0;
            current_len = 0;
        }
        current_count += 1;
        current_len += len;
    }

    if current_count > 0 {
        pages.push(current_count);
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_when_next_paragraph_exceeds_budget() {
        assert_eq!(pack_by_char_budget(&[1000, 800, 100], 1500), vec![1, 2]);
    }

    #[test]
    fn exact_fit_stays_on_page() {
        assert_eq!(pack_by_char_budget(&[700, 800, 1], 1500), vec![2, 1]);
    }

    #[test]
    fn oversized_paragraph_is_kept_whole() {
        assert_eq!(pack_by_char_budget(&[3000, 10, 4000], 1500), vec![1, 1, 1]);
    }

    #[test]
    fn empty_input_has_no_pages() {
        assert!(pack_by_char_budget(&[], 1500).is_empty());
    }
}
