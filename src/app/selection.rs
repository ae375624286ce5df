//! Multi-select state for the email list.
//!
//! Tracks the set of selected email ids plus the anchor index of the
//! most recent discrete selection, used as one endpoint of a shift-style
//! range selection. The anchor is only meaningful against the ordered
//! list it was recorded for; the dashboard clears it whenever the view's
//! membership or order changes.

use std::collections::HashSet;

use crate::domain::{EmailId, ProcessedEmail};

/// In-memory selection state. No remote side effects.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: HashSet<EmailId>,
    anchor: Option<usize>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the given email is selected.
    pub fn is_selected(&self, id: &EmailId) -> bool {
        self.selected.contains(id)
    }

    /// Number of selected emails.
    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in arbitrary order.
    pub fn ids(&self) -> Vec<EmailId> {
        self.selected.iter().cloned().collect()
    }

    /// Anchor index of the last discrete selection action, if any.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Flips membership of `id` and records `index` as the new anchor,
    /// whether the toggle added or removed the id.
    pub fn toggle(&mut self, id: EmailId, index: usize) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
        self.anchor = Some(index);
    }

    /// Extends the selection to cover the inclusive interval between the
    /// anchor and `target_index`, in either direction. Items outside the
    /// range are never removed. Without an anchor this selects only the
    /// target item and anchors there.
    pub fn range_select(&mut self, target_index: usize, items: &[ProcessedEmail]) {
        let Some(anchor) = self.anchor else {
            if let Some(item) = items.get(target_index) {
                self.selected = HashSet::from([item.id.clone()]);
                self.anchor = Some(target_index);
            }
            return;
        };

        let (start, end) = (anchor.min(target_index), anchor.max(target_index));
        for item in items.iter().skip(start).take(end - start + 1) {
            self.selected.insert(item.id.clone());
        }
    }

    /// Replaces the selection with every id in `items`.
    pub fn select_all(&mut self, items: &[ProcessedEmail]) {
        self.selected = items.iter().map(|e| e.id.clone()).collect();
    }

    /// Replaces the selection with exactly `{id}` and anchors at `index`.
    pub fn select_only(&mut self, id: EmailId, index: usize) {
        self.selected = HashSet::from([id]);
        self.anchor = Some(index);
    }

    /// Empties the selection and resets the anchor.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }

    /// Drops the anchor without touching the selected set. Called when
    /// the rendered list the anchor was recorded against has changed.
    pub fn clear_anchor(&mut self) {
        self.anchor = None;
    }
}
