//! Sender blacklist entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blocked sender pattern: either a bare domain or a full address.
///
/// Append-only from this core's perspective; inserting a duplicate
/// pattern is treated as success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub id: String,
    /// Domain (`badcompany.com`) or full address pattern.
    pub email_pattern: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Derives the blacklist pattern for a sender address.
///
/// Addresses with an `@` are blocked by domain; anything else is
/// blocked verbatim.
pub fn pattern_for_sender(sender_email: &str) -> &str {
    match sender_email.split_once('@') {
        Some((_, domain)) => domain,
        None => sender_email,
    }
}
