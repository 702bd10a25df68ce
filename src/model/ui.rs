//! Presentation state shared between the table and the app shell

/// Where typed characters go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Characters edit the start block search
    Search,
}

/// Resolved view of one query for the current variables
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Load<T> {
    #[default]
    Loading,
    /// The query failed; details are logged, not shown
    Failed,
    Ready(T),
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Load::Failed)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }
}
