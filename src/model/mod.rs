//! Model layer
//!
//! - `Epoch` / `TokenAmount` - records decoded from the subgraph
//! - `TableState` / `Sort` - user-controlled view state
//! - `ModalStack` - overlay management

pub mod amount;
pub mod epoch;
pub mod modal;
pub mod sort;
pub mod table_state;
pub mod ui;

pub use epoch::Epoch;
pub use sort::{SortDirection, SortField};
pub use table_state::{page_count, TableState, PAGE_SIZE};
pub use ui::{InputMode, Load};
