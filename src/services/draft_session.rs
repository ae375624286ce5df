//! Draft generation session.
//!
//! Owns one email's reply draft from generation through editing to
//! save. Streamed text accumulates in a live buffer the caller can
//! render after every [`DraftSession::pump`]; the editable buffer is
//! only committed from the live buffer when the stream completes or
//! the user stops it. A mid-stream failure leaves the editable buffer
//! exactly as it was.

use futures::StreamExt;
use tracing::{debug, warn};

use crate::domain::{Category, MessageId, Priority};
use crate::providers::ai::{DraftProvider, DraftRequest, GenerationStream, Tone};
use crate::store::{StoreError, TriageStore};

/// The email a session drafts a reply to.
#[derive(Debug, Clone)]
pub struct DraftContext {
    pub email_id: MessageId,
    pub sender_name: Option<String>,
    pub sender_email: String,
    pub subject: String,
    pub snippet: Option<String>,
    pub category: Category,
    pub priority: Priority,
    pub user_name: Option<String>,
}

/// Outcome of one [`DraftSession::pump`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationProgress {
    /// No stream is open.
    Idle,
    /// A chunk arrived and was appended to the live buffer.
    Streamed,
    /// The stream ended; the full text was committed for editing.
    Finished,
    /// The stream failed; the editable buffer was left untouched.
    Failed,
}

/// One draft-reply session for a single email.
pub struct DraftSession {
    context: DraftContext,
    tone: Tone,
    live: String,
    edited: String,
    error: Option<String>,
    saving: bool,
    stream: Option<GenerationStream>,
}

impl DraftSession {
    pub fn new(context: DraftContext, tone: Tone) -> Self {
        Self {
            context,
            tone,
            live: String::new(),
            edited: String::new(),
            error: None,
            saving: false,
            stream: None,
        }
    }

    pub fn context(&self) -> &DraftContext {
        &self.context
    }

    /// True while a generation stream is open.
    pub fn is_generating(&self) -> bool {
        self.stream.is_some()
    }

    /// Text streamed so far in the current (or last) generation.
    pub fn completion(&self) -> &str {
        &self.live
    }

    /// The user-editable draft text.
    pub fn edited_content(&self) -> &str {
        &self.edited
    }

    pub fn set_edited_content(&mut self, content: impl Into<String>) {
        self.edited = content.into();
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Records the tone for the next generation. Never triggers one.
    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Opens a generation stream for this session's email.
    ///
    /// Clears the previous error and live buffer first; the editable
    /// buffer is untouched until the stream completes. On failure the
    /// error is recorded in display form and no stream is opened.
    pub async fn generate(&mut self, provider: &dyn DraftProvider, tone: Option<Tone>) {
        if let Some(tone) = tone {
            self.tone = tone;
        }
        self.error = None;
        self.live.clear();
        // A still-open stream belongs to the previous generation and
        // must not feed the cleared live buffer.
        self.stream = None;

        let request = DraftRequest {
            sender_name: self.context.sender_name.clone(),
            sender_email: self.context.sender_email.clone(),
            subject: self.context.subject.clone(),
            snippet: self.context.snippet.clone(),
            category: self.context.category,
            priority: self.context.priority,
            user_name: self.context.user_name.clone(),
            tone: self.tone,
        };

        match provider.stream_draft(&request).await {
            Ok(stream) => {
                debug!(provider = provider.name(), email_id = %self.context.email_id, "draft generation started");
                self.stream = Some(stream);
            }
            Err(e) => {
                warn!(error = %e, "draft generation failed to start");
                self.error = Some(e.user_message());
            }
        }
    }

    /// Advances the open stream by one chunk.
    pub async fn pump(&mut self) -> GenerationProgress {
        let Some(stream) = self.stream.as_mut() else {
            return GenerationProgress::Idle;
        };

        match stream.next().await {
            Some(Ok(chunk)) => {
                self.live.push_str(&chunk.text);
                GenerationProgress::Streamed
            }
            Some(Err(e)) => {
                warn!(error = %e, "draft generation stream failed");
                self.stream = None;
                self.error = Some(e.user_message());
                GenerationProgress::Failed
            }
            None => {
                self.stream = None;
                self.edited = self.live.clone();
                GenerationProgress::Finished
            }
        }
    }

    /// Drives the stream until it finishes, fails, or was never open.
    pub async fn run_to_completion(&mut self) -> GenerationProgress {
        loop {
            match self.pump().await {
                GenerationProgress::Streamed => continue,
                outcome => return outcome,
            }
        }
    }

    /// Stops generation immediately. Whatever text has streamed so far
    /// becomes the editable draft; nothing is treated as an error.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() && !self.live.is_empty() {
            self.edited = self.live.clone();
        }
    }

    /// Discards the current editable draft and generates a fresh one.
    pub async fn regenerate(&mut self, provider: &dyn DraftProvider, tone: Option<Tone>) {
        self.edited.clear();
        self.generate(provider, tone).await;
    }

    /// Persists the edited draft. Returns true on success; a blank
    /// draft is rejected locally and a store failure leaves the buffer
    /// intact for retry.
    pub async fn save(&mut self, store: &dyn TriageStore) -> bool {
        let content = self.edited.trim().to_string();
        if content.is_empty() {
            self.error = Some("Cannot save empty draft".into());
            return false;
        }

        self.saving = true;
        self.error = None;
        let subject = format!("Re: {}", self.context.subject);
        let result = store
            .upsert_draft(&self.context.email_id, &content, Some(&subject))
            .await;
        self.saving = false;

        match result {
            Ok(draft_id) => {
                debug!(%draft_id, email_id = %self.context.email_id, "draft saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to save draft");
                // Surface the store's own message when it has one.
                self.error = Some(match e {
                    StoreError::Api { message, .. } if !message.is_empty() => message,
                    _ => "Failed to save draft".into(),
                });
                false
            }
        }
    }

    /// Resets all buffers and the error. The open stream, if any, is
    /// dropped without committing.
    pub fn clear(&mut self) {
        self.stream = None;
        self.live.clear();
        self.edited.clear();
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BlacklistEntry, Digest, DraftId, DraftResponse, DraftStatus, EmailId, EmailStatus,
        ProcessedEmail,
    };
    use crate::providers::ai::{
        DraftError, DraftResult, FieldError, GenerationChunk,
    };
    use crate::store::{StoreError, StoreResult};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn context() -> DraftContext {
        DraftContext {
            email_id: MessageId::from("msg-1"),
            sender_name: Some("Alice".into()),
            sender_email: "alice@example.com".into(),
            subject: "Invoice".into(),
            snippet: Some("Payment due Friday".into()),
            category: Category::Billing,
            priority: Priority::High,
            user_name: None,
        }
    }

    /// Provider that plays back a fixed sequence of stream items.
    struct ScriptedProvider {
        script: Mutex<Option<Vec<DraftResult<GenerationChunk>>>>,
    }

    impl ScriptedProvider {
        fn chunks(texts: &[&str]) -> Self {
            let items = texts
                .iter()
                .map(|t| Ok(GenerationChunk { text: t.to_string() }))
                .collect();
            Self {
                script: Mutex::new(Some(items)),
            }
        }

        fn with_items(items: Vec<DraftResult<GenerationChunk>>) -> Self {
            Self {
                script: Mutex::new(Some(items)),
            }
        }
    }

    #[async_trait]
    impl DraftProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn stream_draft(&self, request: &DraftRequest) -> DraftResult<GenerationStream> {
            request.validate()?;
            let items = self
                .script
                .lock()
                .unwrap()
                .take()
                .expect("stream opened twice");
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    /// Provider that always fails to open a stream.
    struct FailingProvider;

    #[async_trait]
    impl DraftProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn stream_draft(&self, _request: &DraftRequest) -> DraftResult<GenerationStream> {
            Err(DraftError::Validation {
                details: vec![FieldError {
                    field: "subject",
                    message: "Subject is required".into(),
                }],
            })
        }
    }

    /// Store that records upsert calls and can be told to fail with a
    /// given API message.
    #[derive(Default)]
    struct RecordingStore {
        saved: Mutex<Vec<(String, String, Option<String>)>>,
        fail_message: Option<String>,
    }

    #[async_trait]
    impl TriageStore for RecordingStore {
        async fn emails_for_date(&self, _date: NaiveDate) -> StoreResult<Vec<ProcessedEmail>> {
            Ok(Vec::new())
        }

        async fn digest_for_date(&self, _date: NaiveDate) -> StoreResult<Option<Digest>> {
            Ok(None)
        }

        async fn pending_drafts(&self) -> StoreResult<Vec<DraftResponse>> {
            Ok(Vec::new())
        }

        async fn set_status(&self, _ids: &[EmailId], _status: EmailStatus) -> StoreResult<()> {
            Ok(())
        }

        async fn set_priority(&self, _ids: &[EmailId], _priority: Priority) -> StoreResult<()> {
            Ok(())
        }

        async fn insert_blacklist(&self, _pattern: &str, _reason: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn blacklist_entries(&self) -> StoreResult<Vec<BlacklistEntry>> {
            Ok(Vec::new())
        }

        async fn remove_blacklist(&self, _id: &str) -> StoreResult<()> {
            Ok(())
        }

        async fn upsert_draft(
            &self,
            email_id: &MessageId,
            content: &str,
            subject: Option<&str>,
        ) -> StoreResult<DraftId> {
            if let Some(message) = &self.fail_message {
                return Err(StoreError::Api {
                    status: 500,
                    message: message.clone(),
                });
            }
            self.saved.lock().unwrap().push((
                email_id.0.clone(),
                content.to_string(),
                subject.map(str::to_string),
            ));
            Ok(DraftId::from("draft-1"))
        }

        async fn set_draft_status(
            &self,
            _draft_id: &DraftId,
            _status: DraftStatus,
        ) -> StoreResult<()> {
            Ok(())
        }

        async fn delete_draft(&self, _draft_id: &DraftId) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn completed_stream_commits_full_text() {
        let provider = ScriptedProvider::chunks(&["Hi ", "Alice, ", "thanks!"]);
        let mut session = DraftSession::new(context(), Tone::default());

        session.generate(&provider, None).await;
        assert!(session.is_generating());

        let outcome = session.run_to_completion().await;
        assert_eq!(outcome, GenerationProgress::Finished);
        assert!(!session.is_generating());
        assert_eq!(session.completion(), "Hi Alice, thanks!");
        assert_eq!(session.edited_content(), "Hi Alice, thanks!");
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn stop_commits_partial_text_without_error() {
        let provider = ScriptedProvider::chunks(&["Partial ", "text ", "never seen"]);
        let mut session = DraftSession::new(context(), Tone::default());

        session.generate(&provider, None).await;
        assert_eq!(session.pump().await, GenerationProgress::Streamed);
        assert_eq!(session.pump().await, GenerationProgress::Streamed);

        session.stop();
        assert!(!session.is_generating());
        assert_eq!(session.edited_content(), "Partial text ");
        assert!(session.error().is_none());
    }

    #[tokio::test]
    async fn stop_with_nothing_streamed_leaves_edit_buffer_alone() {
        let provider = ScriptedProvider::chunks(&["unreached"]);
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("hand-written draft");

        session.generate(&provider, None).await;
        session.stop();
        assert_eq!(session.edited_content(), "hand-written draft");
    }

    #[tokio::test]
    async fn mid_stream_failure_preserves_edit_buffer() {
        let provider = ScriptedProvider::with_items(vec![
            Ok(GenerationChunk { text: "some ".into() }),
            Err(DraftError::Stream("connection reset".into())),
        ]);
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("previous draft");

        session.generate(&provider, None).await;
        let outcome = session.run_to_completion().await;

        assert_eq!(outcome, GenerationProgress::Failed);
        assert_eq!(session.edited_content(), "previous draft");
        assert_eq!(session.error(), Some("Failed to generate draft"));
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn failed_open_records_user_message() {
        let mut session = DraftSession::new(context(), Tone::default());
        session.generate(&FailingProvider, None).await;

        assert!(!session.is_generating());
        assert_eq!(session.error(), Some("Validation failed"));
        assert_eq!(session.pump().await, GenerationProgress::Idle);
    }

    #[tokio::test]
    async fn generate_clears_previous_error_and_live_text() {
        let mut session = DraftSession::new(context(), Tone::default());
        session.generate(&FailingProvider, None).await;
        assert!(session.error().is_some());

        let provider = ScriptedProvider::chunks(&["fresh"]);
        session.generate(&provider, None).await;
        assert!(session.error().is_none());
        assert_eq!(session.completion(), "");
        session.run_to_completion().await;
        assert_eq!(session.edited_content(), "fresh");
    }

    #[tokio::test]
    async fn failed_restart_drops_the_previous_stream() {
        let provider = ScriptedProvider::chunks(&["stale ", "chunks"]);
        let mut session = DraftSession::new(context(), Tone::default());
        session.generate(&provider, None).await;
        assert_eq!(session.pump().await, GenerationProgress::Streamed);

        session.generate(&FailingProvider, None).await;
        assert!(!session.is_generating());
        // No leftover chunks from the first stream can arrive.
        assert_eq!(session.pump().await, GenerationProgress::Idle);
        assert_eq!(session.completion(), "");
    }

    #[tokio::test]
    async fn regenerate_discards_edits_first() {
        let provider = ScriptedProvider::chunks(&["new draft"]);
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("old edits");

        session.regenerate(&provider, Some(Tone::Concise)).await;
        assert_eq!(session.edited_content(), "");
        assert_eq!(session.tone(), Tone::Concise);

        session.run_to_completion().await;
        assert_eq!(session.edited_content(), "new draft");
    }

    #[tokio::test]
    async fn set_tone_alone_never_generates() {
        let mut session = DraftSession::new(context(), Tone::Professional);
        session.set_tone(Tone::Friendly);
        assert_eq!(session.tone(), Tone::Friendly);
        assert!(!session.is_generating());
        assert_eq!(session.pump().await, GenerationProgress::Idle);
    }

    #[tokio::test]
    async fn save_persists_trimmed_content_with_reply_subject() {
        let store = RecordingStore::default();
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("  Thanks, will pay Friday.  ");

        assert!(session.save(&store).await);
        assert!(!session.is_saving());

        let saved = store.saved.lock().unwrap();
        assert_eq!(
            *saved,
            vec![(
                "msg-1".to_string(),
                "Thanks, will pay Friday.".to_string(),
                Some("Re: Invoice".to_string()),
            )]
        );
    }

    #[tokio::test]
    async fn blank_draft_is_rejected_without_a_store_call() {
        let store = RecordingStore::default();
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("   \n  ");

        assert!(!session.save(&store).await);
        assert_eq!(session.error(), Some("Cannot save empty draft"));
        assert!(store.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_save_keeps_the_buffer_and_surfaces_the_store_message() {
        let store = RecordingStore {
            fail_message: Some("row violates policy".into()),
            ..Default::default()
        };
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("important draft");

        assert!(!session.save(&store).await);
        assert!(!session.is_saving());
        assert_eq!(session.edited_content(), "important draft");
        assert_eq!(session.error(), Some("row violates policy"));
    }

    #[tokio::test]
    async fn failed_save_without_a_message_uses_the_fallback() {
        let store = RecordingStore {
            fail_message: Some(String::new()),
            ..Default::default()
        };
        let mut session = DraftSession::new(context(), Tone::default());
        session.set_edited_content("important draft");

        assert!(!session.save(&store).await);
        assert_eq!(session.error(), Some("Failed to save draft"));
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let provider = ScriptedProvider::chunks(&["text"]);
        let mut session = DraftSession::new(context(), Tone::default());
        session.generate(&provider, None).await;
        session.run_to_completion().await;

        session.clear();
        assert_eq!(session.completion(), "");
        assert_eq!(session.edited_content(), "");
        assert!(session.error().is_none());
        assert!(!session.is_generating());
    }
}
