//! Free-text search and structured filters over the digest list.
//!
//! Facet counts are always computed over the unfiltered list so the
//! filter chips show totals rather than the already-narrowed subset.
//! The filters themselves compose by AND: text match, then priority,
//! then category, then needs-response.

use std::collections::HashMap;

use crate::domain::{Category, Priority, ProcessedEmail};

/// Active filter predicates. Each structured filter acts as a
/// radio-button-with-off: toggling the active value clears it.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    pub query: String,
    pub priority: Option<Priority>,
    pub category: Option<Category>,
    pub needs_response: bool,
}

/// Counts over the unfiltered list, for filter chips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetCounts {
    pub priorities: HashMap<Priority, usize>,
    pub categories: HashMap<Category, usize>,
    pub needs_response: usize,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Sets the priority filter, or clears it when `priority` is
    /// already active.
    pub fn toggle_priority(&mut self, priority: Priority) {
        self.priority = if self.priority == Some(priority) {
            None
        } else {
            Some(priority)
        };
    }

    /// Sets the category filter, or clears it when `category` is
    /// already active.
    pub fn toggle_category(&mut self, category: Category) {
        self.category = if self.category == Some(category) {
            None
        } else {
            Some(category)
        };
    }

    pub fn toggle_needs_response(&mut self) {
        self.needs_response = !self.needs_response;
    }

    pub fn is_default(&self) -> bool {
        self.query.trim().is_empty()
            && self.priority.is_none()
            && self.category.is_none()
            && !self.needs_response
    }

    /// Tests a single email against every active predicate.
    pub fn matches(&self, email: &ProcessedEmail) -> bool {
        let query = self.query.trim();
        if !query.is_empty() && !text_matches(email, query) {
            return false;
        }

        if let Some(priority) = self.priority {
            if email.priority != priority {
                return false;
            }
        }

        if let Some(category) = self.category {
            if email.category != category {
                return false;
            }
        }

        if self.needs_response && !email.needs_response {
            return false;
        }

        true
    }

    /// Applies every active predicate, preserving input order.
    pub fn apply(&self, emails: &[ProcessedEmail]) -> Vec<ProcessedEmail> {
        emails.iter().filter(|e| self.matches(e)).cloned().collect()
    }
}

fn text_matches(email: &ProcessedEmail, query: &str) -> bool {
    let query = query.to_lowercase();
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .map(|v| v.to_lowercase().contains(&query))
            .unwrap_or(false)
    };

    contains(&email.subject)
        || contains(&email.sender)
        || contains(&email.sender_email)
        || contains(&email.snippet)
}

/// Computes facet counts over the full (unfiltered) list.
pub fn facet_counts(emails: &[ProcessedEmail]) -> FacetCounts {
    let mut counts = FacetCounts::default();
    for email in emails {
        *counts.priorities.entry(email.priority).or_insert(0) += 1;
        *counts.categories.entry(email.category).or_insert(0) += 1;
        if email.needs_response {
            counts.needs_response += 1;
        }
    }
    counts
}
