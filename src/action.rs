//! Semantic operations produced by input handling and applied by `App::update`

use crate::model::SortField;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Periodic tick; drains finished queries
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    Quit,

    // ─────────────────────────────────────────────────────────────────────────
    // Sorting
    // ─────────────────────────────────────────────────────────────────────────
    /// Activate a column header
    SortBy(SortField),

    // ─────────────────────────────────────────────────────────────────────────
    // Pagination
    // ─────────────────────────────────────────────────────────────────────────
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Jump to a 1-based page
    GoToPage(u32),

    // ─────────────────────────────────────────────────────────────────────────
    // Rows
    // ─────────────────────────────────────────────────────────────────────────
    NextRow,
    PrevRow,
    SelectRow(usize),

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    ClearSearch,

    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────
    /// Re-run both queries, bypassing the cache
    Refresh,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenHelp,
    /// Show the selected epoch at full precision
    OpenEpochDetail,
    CloseModal,
}
