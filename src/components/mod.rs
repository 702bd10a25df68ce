//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod epoch_detail;
pub mod epoch_table;
pub mod help_dialog;
pub mod layout;
pub mod pagination;

pub use epoch_detail::EpochDetailDialog;
pub use epoch_table::EpochTableComponent;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
