//! Priority grouping for the rendered list.
//!
//! Emails render in fixed priority buckets (critical, high, medium, low).
//! Keyboard navigation and range selection both use flat indices into the
//! concatenation of those buckets, so each group records the flat index of
//! its first item. Unrecognized priorities can never mint a fifth bucket:
//! the closed [`Priority`] enum already collapsed them to low at the
//! decode boundary.

use crate::domain::{Priority, ProcessedEmail, PRIORITY_ORDER};

/// One non-empty priority bucket in display order.
#[derive(Debug, Clone)]
pub struct PriorityGroup {
    pub priority: Priority,
    /// Flat index of this group's first item when all groups are
    /// concatenated in display order.
    pub start_index: usize,
    pub emails: Vec<ProcessedEmail>,
}

/// Partitions `emails` into priority buckets in display order, skipping
/// empty buckets. Relative order within a bucket is preserved.
pub fn group_by_priority(emails: &[ProcessedEmail]) -> Vec<PriorityGroup> {
    let mut groups = Vec::new();
    let mut offset = 0;

    for priority in PRIORITY_ORDER {
        let bucket: Vec<ProcessedEmail> = emails
            .iter()
            .filter(|e| e.priority == priority)
            .cloned()
            .collect();
        if bucket.is_empty() {
            continue;
        }
        let len = bucket.len();
        groups.push(PriorityGroup {
            priority,
            start_index: offset,
            emails: bucket,
        });
        offset += len;
    }

    groups
}

/// Flat list of emails in group display order. This is the index space
/// shared by the navigation and selection engines.
pub fn flat_email_list(emails: &[ProcessedEmail]) -> Vec<ProcessedEmail> {
    group_by_priority(emails)
        .into_iter()
        .flat_map(|g| g.emails)
        .collect()
}
