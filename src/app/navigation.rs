//! Focus and expansion state for the email list.
//!
//! The focus index is stored raw and clamped on every read against the
//! current item count, so a list that shrinks underneath it (after a
//! dismiss, say) can never leave focus pointing past the end. Growing
//! the list never moves focus.

use crate::domain::EmailId;

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    raw_focus: usize,
    total_items: usize,
    expanded: Option<EmailId>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the item count. Called on every view recompute.
    pub fn set_total(&mut self, total_items: usize) {
        self.total_items = total_items;
    }

    pub fn total(&self) -> usize {
        self.total_items
    }

    /// Effective focus index, clamped to `[0, total-1]` (0 when empty).
    pub fn focused(&self) -> usize {
        if self.total_items == 0 {
            0
        } else {
            self.raw_focus.min(self.total_items - 1)
        }
    }

    /// Moves focus up one row, stopping at 0.
    pub fn move_up(&mut self) {
        self.raw_focus = self.focused().saturating_sub(1);
    }

    /// Moves focus down one row, stopping at the last item.
    pub fn move_down(&mut self) {
        let next = self.focused() + 1;
        self.raw_focus = if self.total_items == 0 {
            0
        } else {
            next.min(self.total_items - 1)
        };
    }

    /// Jumps focus to `index`, clamped to the valid range.
    pub fn move_to(&mut self, index: usize) {
        self.raw_focus = if self.total_items == 0 {
            0
        } else {
            index.min(self.total_items - 1)
        };
    }

    /// Currently expanded email id, if any.
    pub fn expanded(&self) -> Option<&EmailId> {
        self.expanded.as_ref()
    }

    /// Expands `id`, or collapses it if already expanded.
    pub fn toggle_expanded(&mut self, id: EmailId) {
        if self.expanded.as_ref() == Some(&id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id);
        }
    }

    pub fn collapse(&mut self) {
        self.expanded = None;
    }
}
