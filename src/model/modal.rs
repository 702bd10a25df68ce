//! Modal overlays drawn on top of the epoch table
//!
//! Only the top modal receives input; closing it hands focus back to the
//! one below, or to the table when the stack is empty.

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Keyboard shortcut reference
    Help,
    /// Full-precision view of one epoch, by row index on the current page
    EpochDetail { row: usize },
}

#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_stack_push_pop() {
        let mut stack = ModalStack::new();
        assert!(stack.is_empty());

        stack.push(Modal::EpochDetail { row: 2 });
        stack.push(Modal::Help);
        assert_eq!(stack.top(), Some(&Modal::Help));

        assert_eq!(stack.pop(), Some(Modal::Help));
        assert_eq!(stack.top(), Some(&Modal::EpochDetail { row: 2 }));
        assert_eq!(stack.pop(), Some(Modal::EpochDetail { row: 2 }));
        assert!(stack.pop().is_none());
    }
}
