//! Saved draft response entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{DraftId, MessageId};

/// Lifecycle status of a saved draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Pending,
    Sent,
    Discarded,
}

impl DraftStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "sent" => DraftStatus::Sent,
            "discarded" => DraftStatus::Discarded,
            _ => DraftStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Pending => "pending",
            DraftStatus::Sent => "sent",
            DraftStatus::Discarded => "discarded",
        }
    }
}

impl Default for DraftStatus {
    fn default() -> Self {
        DraftStatus::Pending
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn de_draft_status<'de, D>(deserializer: D) -> Result<DraftStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(DraftStatus::parse).unwrap_or_default())
}

/// A draft reply saved against an email's provider message id.
///
/// At most one pending draft per message id is meaningful to the UI;
/// the store client enforces this with an upsert, not the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftResponse {
    pub id: DraftId,
    /// Provider message id of the email being answered.
    pub gmail_id: MessageId,
    /// Draft body text.
    pub draft_content: String,
    /// Optional subject override.
    #[serde(default)]
    pub draft_subject: Option<String>,
    /// Sender of the original email, kept for display.
    #[serde(default)]
    pub original_sender: Option<String>,
    /// Subject of the original email, kept for display.
    #[serde(default)]
    pub original_subject: Option<String>,
    #[serde(default, deserialize_with = "de_draft_status")]
    pub status: DraftStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
