//! Remote triage store.
//!
//! The hosted relational store is consumed through the [`TriageStore`]
//! trait so the action logic stays testable without a live network
//! dependency. The concrete client ([`RestStore`]) is constructed once at
//! startup and injected; nothing in the core imports a singleton.

mod rest;

pub use rest::RestStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    BlacklistEntry, Digest, DraftId, DraftResponse, DraftStatus, EmailId, EmailStatus, MessageId,
    Priority, ProcessedEmail,
};

/// Errors surfaced by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the dashboard needs from the remote store.
///
/// All mutations are one-shot, no built-in retries. Status and priority
/// writes are final-state writes: replaying one is always safe, which is
/// what makes optimistic dismiss/undo pairs converge without per-id
/// request serialization.
#[async_trait]
pub trait TriageStore: Send + Sync {
    /// Active emails filed under `date`, as the store orders them.
    ///
    /// The wire ordering is by priority *as a string* and is never
    /// trusted; callers regroup via [`crate::app::flat_email_list`].
    async fn emails_for_date(&self, date: NaiveDate) -> StoreResult<Vec<ProcessedEmail>>;

    /// Digest aggregate row for `date`, if one exists yet.
    async fn digest_for_date(&self, date: NaiveDate) -> StoreResult<Option<Digest>>;

    /// Pending drafts, newest first.
    async fn pending_drafts(&self) -> StoreResult<Vec<DraftResponse>>;

    /// Sets the status of every id in `ids`.
    async fn set_status(&self, ids: &[EmailId], status: EmailStatus) -> StoreResult<()>;

    /// Sets the priority of every id in `ids`.
    async fn set_priority(&self, ids: &[EmailId], priority: Priority) -> StoreResult<()>;

    /// Inserts a blacklist pattern. Inserting an existing pattern is
    /// success, not an error.
    async fn insert_blacklist(&self, pattern: &str, reason: &str) -> StoreResult<()>;

    /// All blacklist entries, newest first.
    async fn blacklist_entries(&self) -> StoreResult<Vec<BlacklistEntry>>;

    /// Removes a blacklist entry by row id.
    async fn remove_blacklist(&self, id: &str) -> StoreResult<()>;

    /// Creates or updates the draft for `email_id`: updates content,
    /// subject, and timestamp when a row exists, otherwise inserts a new
    /// pending row. Returns the draft row id.
    async fn upsert_draft(
        &self,
        email_id: &MessageId,
        content: &str,
        subject: Option<&str>,
    ) -> StoreResult<DraftId>;

    /// Updates a draft's lifecycle status.
    async fn set_draft_status(&self, draft_id: &DraftId, status: DraftStatus) -> StoreResult<()>;

    /// Deletes a draft row.
    async fn delete_draft(&self, draft_id: &DraftId) -> StoreResult<()>;
}
