//! User-controlled state of the epoch table
//!
//! This is the single source of truth the query variables are derived from.
//! Every mutation that changes the result set (sort, search) sends the view
//! back to the first page.

use super::sort::{Sort, SortField};

/// Rows per page
pub const PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    sort: Sort,
    /// 1-based page number
    page: u32,
    /// Raw search text as typed
    search: String,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new()
    }
}

impl TableState {
    pub fn new() -> Self {
        Self {
            sort: Sort::default(),
            page: 1,
            search: String::new(),
        }
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Derived values
    // ─────────────────────────────────────────────────────────────────────────

    /// Offset of the first row on the current page
    pub fn skip(&self) -> u32 {
        (self.page - 1).saturating_mul(PAGE_SIZE)
    }

    /// Exact-match `startBlock` filter, if the search text is an integer
    ///
    /// Negative numbers are passed through and simply match nothing.
    pub fn start_block_filter(&self) -> Option<i64> {
        let text = self.search.trim();
        if text.is_empty() {
            return None;
        }
        text.parse().ok()
    }

    /// Search text is present but does not parse as an integer
    pub fn search_is_ignored(&self) -> bool {
        !self.search.trim().is_empty() && self.start_block_filter().is_none()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Activate a column header and return to the first page
    pub fn sort_by(&mut self, field: SortField) {
        self.sort.activate(field);
        self.page = 1;
    }

    /// Replace the search text and return to the first page
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
        self.page = 1;
    }

    /// Remove the last character; returns false when the text was already empty
    pub fn pop_search_char(&mut self) -> bool {
        let popped = self.search.pop().is_some();
        if popped {
            self.page = 1;
        }
        popped
    }

    /// Jump to a page, clamped to `1..=limit` when the page count is known
    ///
    /// Returns whether the page changed.
    pub fn go_to_page(&mut self, page: u32, limit: Option<u32>) -> bool {
        let mut target = page.max(1);
        if let Some(limit) = limit {
            target = target.min(limit.max(1));
        }
        let changed = target != self.page;
        self.page = target;
        changed
    }
}

/// Number of pages needed for `count` matching rows
pub fn page_count(count: usize) -> u32 {
    let pages = count.div_ceil(PAGE_SIZE as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sort::SortDirection;

    #[test]
    fn test_initial_state() {
        let state = TableState::new();
        assert_eq!(state.page(), 1);
        assert_eq!(state.skip(), 0);
        assert_eq!(state.sort().field, SortField::StartBlock);
        assert_eq!(state.sort().direction, SortDirection::Ascending);
        assert_eq!(state.start_block_filter(), None);
    }

    #[test]
    fn test_skip_follows_page() {
        let mut state = TableState::new();
        for page in 1..=25 {
            state.go_to_page(page, None);
            assert_eq!(state.skip(), (page - 1) * 10);
        }
    }

    #[test]
    fn test_search_resets_page() {
        let mut state = TableState::new();
        state.go_to_page(4, None);
        state.set_search("12345");
        assert_eq!(state.page(), 1);
        assert_eq!(state.start_block_filter(), Some(12345));

        state.go_to_page(3, None);
        state.push_search_char('6');
        assert_eq!(state.page(), 1);

        state.go_to_page(2, None);
        assert!(state.pop_search_char());
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_sort_resets_page() {
        let mut state = TableState::new();
        state.go_to_page(5, None);
        state.sort_by(SortField::EndBlock);
        assert_eq!(state.page(), 1);
        assert_eq!(state.sort().field, SortField::EndBlock);
        assert_eq!(state.sort().direction, SortDirection::Ascending);

        state.go_to_page(2, None);
        state.sort_by(SortField::EndBlock);
        assert_eq!(state.page(), 1);
        assert_eq!(state.sort().direction, SortDirection::Descending);
    }

    #[test]
    fn test_empty_or_non_numeric_search_removes_filter() {
        let mut state = TableState::new();
        state.set_search("");
        assert_eq!(state.start_block_filter(), None);
        assert!(!state.search_is_ignored());

        state.set_search("abc");
        assert_eq!(state.start_block_filter(), None);
        assert!(state.search_is_ignored());

        state.set_search("-");
        assert_eq!(state.start_block_filter(), None);
        assert!(state.search_is_ignored());

        state.set_search(" 0 ");
        assert_eq!(state.start_block_filter(), Some(0));
    }

    #[test]
    fn test_negative_search_is_a_filter() {
        let mut state = TableState::new();
        state.set_search("-5");
        assert_eq!(state.start_block_filter(), Some(-5));
        assert!(!state.search_is_ignored());
    }

    #[test]
    fn test_pop_on_empty_search_keeps_page() {
        let mut state = TableState::new();
        state.go_to_page(3, None);
        assert!(!state.pop_search_char());
        assert_eq!(state.page(), 3);
    }

    #[test]
    fn test_go_to_page_clamps() {
        let mut state = TableState::new();
        assert!(!state.go_to_page(0, None));
        assert_eq!(state.page(), 1);

        assert!(state.go_to_page(9, Some(4)));
        assert_eq!(state.page(), 4);

        state.go_to_page(3, Some(0));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0), 0);
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(11), 2);
        assert_eq!(page_count(1000), 100);
    }
}
