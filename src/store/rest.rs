//! PostgREST-style HTTP client for the hosted store.
//!
//! Speaks the `/rest/v1/<table>` dialect: equality filters as query
//! parameters, `PATCH` with an `in.(…)` filter for bulk updates, and a
//! JSON error body carrying the Postgres error code. The one quirk worth
//! knowing: inserting a duplicate blacklist pattern violates a unique
//! constraint (`23505`) and is deliberately mapped to success.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{StoreError, StoreResult, TriageStore};
use crate::domain::{
    BlacklistEntry, Digest, DraftId, DraftResponse, DraftStatus, EmailId, EmailStatus, MessageId,
    Priority, ProcessedEmail,
};

const UNIQUE_VIOLATION: &str = "23505";

/// Error body shape returned by the store.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the hosted relational store.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Creates a client for the store at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert("Authorization", value);
        }
        headers
    }

    fn request(&self, method: Method, table: &str, query: &str) -> RequestBuilder {
        let url = if query.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, table)
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, table, query)
        };
        self.client.request(method, url).headers(self.headers())
    }

    async fn error_for(response: Response) -> StoreError {
        let status = response.status().as_u16();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => StoreError::Api {
                status,
                message: body.message.unwrap_or_else(|| format!("HTTP {status}")),
            },
            Err(_) => StoreError::Api {
                status,
                message: format!("HTTP {status}"),
            },
        }
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> StoreResult<Vec<T>> {
        let response = self.request(Method::GET, table, query).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let rows = response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        Ok(rows)
    }

    async fn patch(&self, table: &str, query: &str, body: serde_json::Value) -> StoreResult<()> {
        let response = self
            .request(Method::PATCH, table, query)
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }
}

/// Formats a PostgREST `in.(…)` filter for a set of ids.
fn in_filter(ids: &[EmailId]) -> String {
    let joined = ids
        .iter()
        .map(|id| format!("\"{}\"", id.0))
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({joined})")
}

#[async_trait]
impl TriageStore for RestStore {
    async fn emails_for_date(&self, date: NaiveDate) -> StoreResult<Vec<ProcessedEmail>> {
        // order=priority.asc matches the original wire behavior; callers
        // regroup and never rely on this string ordering.
        let query = format!(
            "select=*&digest_date=eq.{date}&status=eq.active&order=priority.asc"
        );
        self.fetch("processed_emails", &query).await
    }

    async fn digest_for_date(&self, date: NaiveDate) -> StoreResult<Option<Digest>> {
        let query = format!("select=*&date=eq.{date}&limit=1");
        let mut rows: Vec<Digest> = self.fetch("digests", &query).await?;
        Ok(rows.pop())
    }

    async fn pending_drafts(&self) -> StoreResult<Vec<DraftResponse>> {
        self.fetch(
            "draft_responses",
            "select=*&status=eq.pending&order=created_at.desc",
        )
        .await
    }

    async fn set_status(&self, ids: &[EmailId], status: EmailStatus) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let query = format!("id={}", in_filter(ids));
        self.patch(
            "processed_emails",
            &query,
            json!({ "status": status.as_str() }),
        )
        .await
    }

    async fn set_priority(&self, ids: &[EmailId], priority: Priority) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let query = format!("id={}", in_filter(ids));
        self.patch(
            "processed_emails",
            &query,
            json!({ "priority": priority.as_str() }),
        )
        .await
    }

    async fn insert_blacklist(&self, pattern: &str, reason: &str) -> StoreResult<()> {
        let response = self
            .request(Method::POST, "blacklist", "")
            .header("Prefer", "return=minimal")
            .json(&json!({ "email_pattern": pattern, "reason": reason }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        if let Ok(body) = response.json::<ApiErrorBody>().await {
            // Pattern already blacklisted: idempotent success.
            if body.code.as_deref() == Some(UNIQUE_VIOLATION) {
                return Ok(());
            }
            return Err(StoreError::Api {
                status,
                message: body.message.unwrap_or_else(|| format!("HTTP {status}")),
            });
        }
        Err(StoreError::Api {
            status,
            message: format!("HTTP {status}"),
        })
    }

    async fn blacklist_entries(&self) -> StoreResult<Vec<BlacklistEntry>> {
        self.fetch("blacklist", "select=*&order=created_at.desc")
            .await
    }

    async fn remove_blacklist(&self, id: &str) -> StoreResult<()> {
        let response = self
            .request(Method::DELETE, "blacklist", &format!("id=eq.{id}"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        Ok(())
    }

    async fn upsert_draft(
        &self,
        email_id: &MessageId,
        content: &str,
        subject: Option<&str>,
    ) -> StoreResult<DraftId> {
        #[derive(Deserialize)]
        struct IdRow {
            id: DraftId,
        }

        // Check for an existing row for this message id first; the store
        // itself does not enforce one-pending-draft-per-email.
        let query = format!("select=id&gmail_id=eq.{}", email_id.0);
        let existing: Vec<IdRow> = self.fetch("draft_responses", &query).await?;

        if let Some(row) = existing.into_iter().next() {
            self.patch(
                "draft_responses",
                &format!("id=eq.{}", row.id.0),
                json!({
                    "draft_content": content,
                    "draft_subject": subject,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await?;
            return Ok(row.id);
        }

        let response = self
            .request(Method::POST, "draft_responses", "select=id")
            .header("Prefer", "return=representation")
            .json(&json!({
                "gmail_id": email_id.0,
                "draft_content": content,
                "draft_subject": subject,
                "status": DraftStatus::Pending.as_str(),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }
        let mut rows: Vec<IdRow> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        rows.pop()
            .map(|row| row.id)
            .ok_or_else(|| StoreError::InvalidResponse("insert returned no row".into()))
    }

    async fn set_draft_status(&self, draft_id: &DraftId, status: DraftStatus) -> StoreResult<()> {
        self.patch(
            "draft_responses",
            &format!("id=eq.{}", draft_id.0),
            json!({
                "status": status.as_str(),
                "updated_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn delete_draft(&self, draft_id: &DraftId) -> StoreResult<()> {
        let response = self
            .request(
                Method::DELETE,
                "draft_responses",
                &format!("id=eq.{}", draft_id.0),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(response).await)
    }
}
