//! Processed email entity and its closed triage enumerations.
//!
//! Emails arrive from an out-of-scope ingestion pipeline and may carry
//! null or unrecognized priority/category/status strings. Those values
//! are decoded leniently at this boundary: unknown priority becomes
//! [`Priority::Low`], unknown category becomes [`Category::Other`], and
//! unknown status becomes [`EmailStatus::Active`]. Nothing downstream
//! ever sees a fifth ad hoc bucket.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::{EmailId, MessageId, ThreadId};

/// Triage priority, in severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

/// Fixed display order for priority groups, most severe first.
pub const PRIORITY_ORDER: [Priority; 4] = [
    Priority::Critical,
    Priority::High,
    Priority::Medium,
    Priority::Low,
];

impl Priority {
    /// Decodes a raw store value, mapping anything unrecognized to `Low`.
    pub fn parse(value: &str) -> Self {
        match value {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }

    /// Wire representation used by the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest category tag assigned by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Rav,
    Billing,
    Personal,
    ActionRequired,
    Other,
}

impl Category {
    /// Decodes a raw store value, mapping anything unrecognized to `Other`.
    pub fn parse(value: &str) -> Self {
        match value {
            "rav" => Category::Rav,
            "billing" => Category::Billing,
            "personal" => Category::Personal,
            "action_required" => Category::ActionRequired,
            _ => Category::Other,
        }
    }

    /// Wire representation used by the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rav => "rav",
            Category::Billing => "billing",
            Category::Personal => "personal",
            Category::ActionRequired => "action_required",
            Category::Other => "other",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Rav => "RAV",
            Category::Billing => "Billing",
            Category::Personal => "Personal",
            Category::ActionRequired => "Action",
            Category::Other => "Other",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a processed email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Active,
    Dismissed,
    Archived,
}

impl EmailStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "dismissed" => EmailStatus::Dismissed,
            "archived" => EmailStatus::Archived,
            _ => EmailStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Active => "active",
            EmailStatus::Dismissed => "dismissed",
            EmailStatus::Archived => "archived",
        }
    }
}

impl Default for EmailStatus {
    fn default() -> Self {
        EmailStatus::Active
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn de_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Priority::parse).unwrap_or_default())
}

fn de_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Category::parse).unwrap_or_default())
}

fn de_status<'de, D>(deserializer: D) -> Result<EmailStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map(EmailStatus::parse).unwrap_or_default())
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<bool> = Option::deserialize(deserializer)?;
    Ok(raw.unwrap_or(false))
}

/// A categorized, prioritized email in a daily digest.
///
/// Created by the ingestion pipeline; this core mutates only `status`
/// and `priority`, and never deletes rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEmail {
    /// Store row id.
    pub id: EmailId,
    /// Provider-assigned message id.
    pub gmail_id: MessageId,
    /// Sender display name.
    #[serde(default)]
    pub sender: Option<String>,
    /// Sender address.
    #[serde(default)]
    pub sender_email: Option<String>,
    /// Subject line.
    #[serde(default)]
    pub subject: Option<String>,
    /// Short preview of the content.
    #[serde(default)]
    pub snippet: Option<String>,
    /// Triage priority; absent or unrecognized values decode to low.
    #[serde(default, deserialize_with = "de_priority")]
    pub priority: Priority,
    /// Digest category; absent or unrecognized values decode to other.
    #[serde(default, deserialize_with = "de_category")]
    pub category: Category,
    /// Lifecycle status; absent values decode to active.
    #[serde(default, deserialize_with = "de_status")]
    pub status: EmailStatus,
    /// Whether the ingestion pipeline flagged this as needing a reply.
    #[serde(default, deserialize_with = "de_flag")]
    pub needs_response: bool,
    /// Logical day bucket, independent of the receipt timestamp.
    #[serde(default)]
    pub digest_date: Option<NaiveDate>,
    /// Actual receipt timestamp.
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    /// Thread identity.
    #[serde(default)]
    pub thread_id: Option<ThreadId>,
}

impl ProcessedEmail {
    /// Sender display name, falling back to the address.
    pub fn sender_display(&self) -> &str {
        self.sender
            .as_deref()
            .or(self.sender_email.as_deref())
            .unwrap_or("Unknown Sender")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn priority_parse_maps_unknown_to_low() {
        assert_eq!(Priority::parse("critical"), Priority::Critical);
        assert_eq!(Priority::parse("high"), Priority::High);
        assert_eq!(Priority::parse("medium"), Priority::Medium);
        assert_eq!(Priority::parse("low"), Priority::Low);
        assert_eq!(Priority::parse("urgent"), Priority::Low);
        assert_eq!(Priority::parse(""), Priority::Low);
    }

    #[test]
    fn category_parse_maps_unknown_to_other() {
        assert_eq!(Category::parse("rav"), Category::Rav);
        assert_eq!(Category::parse("action_required"), Category::ActionRequired);
        assert_eq!(Category::parse("newsletter"), Category::Other);
    }

    #[test]
    fn email_decodes_null_enums_to_defaults() {
        let json = r#"{
            "id": "em-1",
            "gmail_id": "msg-1",
            "sender": "Alice",
            "sender_email": "alice@example.com",
            "subject": "Hello",
            "snippet": null,
            "priority": null,
            "category": null,
            "status": null,
            "needs_response": null,
            "digest_date": "2026-08-23",
            "received_at": null,
            "thread_id": null
        }"#;

        let email: ProcessedEmail = serde_json::from_str(json).unwrap();
        assert_eq!(email.priority, Priority::Low);
        assert_eq!(email.category, Category::Other);
        assert_eq!(email.status, EmailStatus::Active);
        assert!(!email.needs_response);
        assert_eq!(
            email.digest_date,
            Some(NaiveDate::from_ymd_opt(2026, 8, 23).unwrap())
        );
    }

    #[test]
    fn email_decodes_unrecognized_enum_strings() {
        let json = r#"{
            "id": "em-2",
            "gmail_id": "msg-2",
            "priority": "sev0",
            "category": "spam",
            "status": "quarantined"
        }"#;

        let email: ProcessedEmail = serde_json::from_str(json).unwrap();
        assert_eq!(email.priority, Priority::Low);
        assert_eq!(email.category, Category::Other);
        assert_eq!(email.status, EmailStatus::Active);
    }

    #[test]
    fn sender_display_falls_back() {
        let mut email: ProcessedEmail =
            serde_json::from_str(r#"{"id":"e","gmail_id":"m"}"#).unwrap();
        assert_eq!(email.sender_display(), "Unknown Sender");

        email.sender_email = Some("bob@example.com".into());
        assert_eq!(email.sender_display(), "bob@example.com");

        email.sender = Some("Bob".into());
        assert_eq!(email.sender_display(), "Bob");
    }

    #[test]
    fn priority_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Priority::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(
            serde_json::to_string(&Category::ActionRequired).unwrap(),
            "\"action_required\""
        );
    }
}
