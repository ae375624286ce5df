//! Daily digest aggregate row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate summary for one digest date.
///
/// Read-only to this core; used as a summary fallback when live counts
/// are unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub id: String,
    /// The digest date this row summarizes.
    pub date: NaiveDate,
    /// Rendered digest content blob.
    pub content: String,
    /// Total number of emails in the digest.
    #[serde(default)]
    pub email_count: Option<u32>,
    /// Number of critical-priority emails.
    #[serde(default)]
    pub critical_count: Option<u32>,
    /// Number of high-priority emails.
    #[serde(default)]
    pub high_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_decodes_with_null_counts() {
        let json = r#"{
            "id": "dg-1",
            "date": "2026-08-23",
            "content": "Quiet day.",
            "email_count": null,
            "critical_count": null,
            "high_count": 2,
            "created_at": null
        }"#;

        let digest: Digest = serde_json::from_str(json).unwrap();
        assert_eq!(digest.email_count, None);
        assert_eq!(digest.high_count, Some(2));
        assert_eq!(digest.content, "Quiet day.");
    }
}
