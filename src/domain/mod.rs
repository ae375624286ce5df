//! Domain layer types for the digest triage dashboard.
//!
//! This module contains the core entities used throughout the crate:
//! processed emails with their closed priority/category/status
//! enumerations, digest aggregates, saved draft responses, and sender
//! blacklist entries.

mod blacklist;
mod digest;
mod draft;
mod email;
mod types;

pub use blacklist::{pattern_for_sender, BlacklistEntry};
pub use digest::Digest;
pub use draft::{DraftResponse, DraftStatus};
pub use email::{Category, EmailStatus, Priority, ProcessedEmail, PRIORITY_ORDER};
pub use types::{DraftId, EmailId, MessageId, ThreadId};
