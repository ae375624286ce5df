//! Dashboard orchestrator.
//!
//! Owns the loaded digest data and every interaction engine, and is the
//! only place that talks to the store for triage mutations. Mutations
//! are optimistic: local state changes first, the remote write follows,
//! and a failed write resyncs from the store instead of trying to
//! reconstruct the previous local state.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};
use url::Url;

use super::dates::DateCursor;
use super::filter::{facet_counts, FacetCounts, FilterState};
use super::grouping::{flat_email_list, group_by_priority, PriorityGroup};
use super::keymap::{Action, Keymap, Keystroke};
use super::navigation::NavigationState;
use super::selection::SelectionState;
use crate::domain::{
    pattern_for_sender, Category, Digest, DraftResponse, EmailId, EmailStatus, Priority,
    ProcessedEmail,
};
use crate::store::TriageStore;

const BLACKLIST_REASON: &str = "Blacklisted from dashboard";
const GMAIL_COMPOSE_URL: &str = "https://mail.google.com/mail/";

/// A transient message for the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success { message: String, undoable: bool },
    Error(String),
    Info(String),
}

/// Dashboard state and action orchestration for one triage session.
pub struct Dashboard {
    store: Arc<dyn TriageStore>,
    date: DateCursor,

    emails: Vec<ProcessedEmail>,
    digest: Option<Digest>,
    drafts: Vec<DraftResponse>,
    loading: bool,
    load_error: Option<String>,

    selection: SelectionState,
    navigation: NavigationState,
    filter: FilterState,
    keymap: Keymap,

    opened: Option<ProcessedEmail>,
    pending_blacklist: Option<String>,
    command_palette_open: bool,
    help_open: bool,

    last_dismissed: Vec<EmailId>,
    notices: Vec<Notice>,

    /// Filtered emails in group display order. This is the index space
    /// shared by navigation, selection anchors, and rendering.
    view: Vec<ProcessedEmail>,
}

impl Dashboard {
    pub fn new(store: Arc<dyn TriageStore>, date: DateCursor) -> Self {
        Self {
            store,
            date,
            emails: Vec::new(),
            digest: None,
            drafts: Vec::new(),
            loading: false,
            load_error: None,
            selection: SelectionState::new(),
            navigation: NavigationState::new(),
            filter: FilterState::new(),
            keymap: Keymap::new(),
            opened: None,
            pending_blacklist: None,
            command_palette_open: false,
            help_open: false,
            last_dismissed: Vec::new(),
            notices: Vec::new(),
            view: Vec::new(),
        }
    }

    /// Fetches emails, digest, and pending drafts for the selected date.
    ///
    /// Selection is cleared because its ids may no longer exist; the
    /// opened email is re-pointed at its refreshed row or closed.
    pub async fn load(&mut self) {
        self.loading = true;
        self.load_error = None;
        let date = self.date.selected();

        match self.store.emails_for_date(date).await {
            Ok(emails) => {
                debug!(%date, count = emails.len(), "loaded digest emails");
                self.emails = emails;
            }
            Err(e) => {
                warn!(%date, error = %e, "failed to load emails");
                self.load_error = Some("Failed to load emails".into());
                self.emails.clear();
            }
        }

        match self.store.digest_for_date(date).await {
            Ok(digest) => self.digest = digest,
            Err(e) => {
                warn!(%date, error = %e, "failed to load digest");
                self.digest = None;
            }
        }

        match self.store.pending_drafts().await {
            Ok(drafts) => self.drafts = drafts,
            Err(e) => {
                warn!(error = %e, "failed to load pending drafts");
                self.drafts.clear();
            }
        }

        self.selection.clear();
        if let Some(opened) = &self.opened {
            self.opened = self.emails.iter().find(|e| e.id == opened.id).cloned();
            if self.opened.is_none() {
                self.navigation.collapse();
            }
        }

        self.loading = false;
        self.sync_view();
    }

    /// Recomputes the rendered view from the raw list and the filters.
    /// The selection anchor only survives if the id sequence of the
    /// view is unchanged.
    fn sync_view(&mut self) {
        let filtered = self.filter.apply(&self.emails);
        let view = flat_email_list(&filtered);

        let same_sequence = view.len() == self.view.len()
            && view.iter().zip(&self.view).all(|(a, b)| a.id == b.id);
        if !same_sequence {
            self.selection.clear_anchor();
        }

        self.navigation.set_total(view.len());
        self.view = view;
    }

    fn sync_keymap(&mut self) {
        let modal =
            self.pending_blacklist.is_some() || self.command_palette_open || self.help_open;
        self.keymap.set_list_enabled(!modal);
    }

    // --- read surface ---

    pub fn date(&self) -> &DateCursor {
        &self.date
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    pub fn pending_drafts(&self) -> &[DraftResponse] {
        &self.drafts
    }

    /// Filtered emails in display order.
    pub fn visible(&self) -> &[ProcessedEmail] {
        &self.view
    }

    /// Visible emails partitioned into non-empty priority groups.
    pub fn groups(&self) -> Vec<PriorityGroup> {
        group_by_priority(&self.filter.apply(&self.emails))
    }

    /// Filter chip counts, always over the unfiltered list.
    pub fn facets(&self) -> FacetCounts {
        facet_counts(&self.emails)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn opened(&self) -> Option<&ProcessedEmail> {
        self.opened.as_ref()
    }

    /// Sender pattern awaiting blacklist confirmation, if any.
    pub fn pending_blacklist(&self) -> Option<&str> {
        self.pending_blacklist.as_deref()
    }

    pub fn command_palette_open(&self) -> bool {
        self.command_palette_open
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    /// Drains accumulated notices for display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- date navigation ---

    pub async fn go_to_date(&mut self, date: NaiveDate) {
        self.date = DateCursor::at(date);
        self.load().await;
    }

    pub async fn prev_day(&mut self) {
        self.date.prev();
        self.load().await;
    }

    pub async fn next_day(&mut self) {
        self.date.next();
        self.load().await;
    }

    // --- filters ---

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
        self.sync_view();
    }

    pub fn toggle_priority_filter(&mut self, priority: Priority) {
        self.filter.toggle_priority(priority);
        self.sync_view();
    }

    pub fn toggle_category_filter(&mut self, category: Category) {
        self.filter.toggle_category(category);
        self.sync_view();
    }

    pub fn toggle_needs_response_filter(&mut self) {
        self.filter.toggle_needs_response();
        self.sync_view();
    }

    // --- focus, open, select ---

    pub fn move_up(&mut self) {
        self.navigation.move_up();
    }

    pub fn move_down(&mut self) {
        self.navigation.move_down();
    }

    /// Opens the focused email, or closes it when already open.
    pub fn open_focused(&mut self) {
        let Some(email) = self.view.get(self.navigation.focused()).cloned() else {
            return;
        };
        self.open_email(email);
    }

    pub fn open_email(&mut self, email: ProcessedEmail) {
        self.navigation.toggle_expanded(email.id.clone());
        self.opened = if self.navigation.expanded().is_some() {
            Some(email)
        } else {
            None
        };
    }

    pub fn close_email(&mut self) {
        self.navigation.collapse();
        self.opened = None;
    }

    pub fn toggle_select_focused(&mut self) {
        let index = self.navigation.focused();
        if let Some(email) = self.view.get(index) {
            self.selection.toggle(email.id.clone(), index);
        }
    }

    pub fn select_all_visible(&mut self) {
        self.selection.select_all(&self.view);
    }

    /// Extends the selection from the anchor to the focused row.
    pub fn range_select_to_focused(&mut self) {
        let view = self.view.clone();
        self.selection.range_select(self.navigation.focused(), &view);
    }

    // --- triage actions ---

    /// Emails a bulk action applies to: the selection when non-empty,
    /// otherwise the opened email.
    fn action_targets(&self) -> Vec<EmailId> {
        if !self.selection.is_empty() {
            self.selection.ids()
        } else if let Some(opened) = &self.opened {
            vec![opened.id.clone()]
        } else {
            Vec::new()
        }
    }

    /// Dismisses the selected (or opened) emails optimistically.
    pub async fn dismiss(&mut self) {
        let ids = self.action_targets();
        if ids.is_empty() {
            return;
        }

        // Local state first; the write follows. The detail view closes
        // even when the opened email is not among the targets.
        self.emails.retain(|e| !ids.contains(&e.id));
        self.selection.clear();
        self.close_email();
        self.sync_view();

        match self.store.set_status(&ids, EmailStatus::Dismissed).await {
            Ok(()) => {
                let message = format!("Dismissed {} {}", ids.len(), plural(ids.len(), "email"));
                debug!(count = ids.len(), "emails dismissed");
                self.last_dismissed = ids;
                self.notices.push(Notice::Success {
                    message,
                    undoable: true,
                });
            }
            Err(e) => {
                warn!(error = %e, "dismiss failed, resyncing");
                self.notices
                    .push(Notice::Error("Failed to dismiss emails".into()));
                self.load().await;
            }
        }
    }

    /// Restores the most recently dismissed batch.
    pub async fn undo_last_dismiss(&mut self) {
        let ids = std::mem::take(&mut self.last_dismissed);
        if ids.is_empty() {
            return;
        }

        match self.store.set_status(&ids, EmailStatus::Active).await {
            Ok(()) => {
                self.notices.push(Notice::Success {
                    message: format!("Restored {} {}", ids.len(), plural(ids.len(), "email")),
                    undoable: false,
                });
                self.load().await;
            }
            Err(e) => {
                warn!(error = %e, "undo dismiss failed");
                self.notices
                    .push(Notice::Error("Failed to restore emails".into()));
            }
        }
    }

    /// Archives the selected (or opened) emails optimistically.
    pub async fn archive(&mut self) {
        let ids = self.action_targets();
        if ids.is_empty() {
            return;
        }

        self.emails.retain(|e| !ids.contains(&e.id));
        self.selection.clear();
        self.close_email();
        self.sync_view();

        match self.store.set_status(&ids, EmailStatus::Archived).await {
            Ok(()) => self.notices.push(Notice::Success {
                message: format!("Archived {} {}", ids.len(), plural(ids.len(), "email")),
                undoable: false,
            }),
            Err(e) => {
                warn!(error = %e, "archive failed, resyncing");
                self.notices
                    .push(Notice::Error("Failed to archive emails".into()));
                self.load().await;
            }
        }
    }

    /// Reprioritizes the selected (or opened) emails optimistically.
    pub async fn set_priority(&mut self, priority: Priority) {
        let ids = self.action_targets();
        if ids.is_empty() {
            return;
        }

        for email in self.emails.iter_mut().filter(|e| ids.contains(&e.id)) {
            email.priority = priority;
        }
        if let Some(opened) = self.opened.as_mut().filter(|o| ids.contains(&o.id)) {
            opened.priority = priority;
        }
        self.sync_view();

        match self.store.set_priority(&ids, priority).await {
            Ok(()) => self.notices.push(Notice::Success {
                message: format!(
                    "Marked {} {} as {}",
                    ids.len(),
                    plural(ids.len(), "email"),
                    priority.label()
                ),
                undoable: false,
            }),
            Err(e) => {
                warn!(error = %e, "priority update failed, resyncing");
                self.notices
                    .push(Notice::Error("Failed to update priority".into()));
                self.load().await;
            }
        }
    }

    /// The email an unambiguous single-target action refers to: the
    /// sole selected email, otherwise the opened one.
    fn single_target(&self) -> Option<&ProcessedEmail> {
        if self.selection.count() == 1 {
            let ids = self.selection.ids();
            self.emails.iter().find(|e| Some(&e.id) == ids.first())
        } else {
            self.opened.as_ref()
        }
    }

    /// Stages a blacklist pattern for the targeted email's sender. The
    /// pattern needs an explicit [`Dashboard::confirm_blacklist`].
    pub fn request_blacklist(&mut self) {
        let Some(email) = self.single_target() else {
            self.notices
                .push(Notice::Error("Select an email to blacklist".into()));
            return;
        };
        let Some(sender_email) = email.sender_email.as_deref() else {
            self.notices
                .push(Notice::Error("Sender address is unknown".into()));
            return;
        };

        self.pending_blacklist = Some(pattern_for_sender(sender_email).to_string());
        self.sync_keymap();
    }

    /// Writes the staged blacklist pattern. Confirming an already
    /// blacklisted pattern still reports success.
    pub async fn confirm_blacklist(&mut self) {
        let Some(pattern) = self.pending_blacklist.take() else {
            return;
        };
        self.sync_keymap();

        match self.store.insert_blacklist(&pattern, BLACKLIST_REASON).await {
            Ok(()) => self.notices.push(Notice::Success {
                message: format!("Blacklisted: {pattern}"),
                undoable: false,
            }),
            Err(e) => {
                warn!(error = %e, %pattern, "blacklist insert failed");
                self.notices
                    .push(Notice::Error("Failed to blacklist sender".into()));
            }
        }
    }

    pub fn cancel_blacklist(&mut self) {
        self.pending_blacklist = None;
        self.sync_keymap();
    }

    /// Compose URL for replying to the targeted email (the opened one,
    /// or the sole selected one).
    pub fn reply(&mut self) -> Option<Url> {
        let Some(email) = self.opened.as_ref().or_else(|| self.single_target()) else {
            self.notices
                .push(Notice::Info("Select an email to reply to".into()));
            return None;
        };
        let Some(to) = email.sender_email.as_deref() else {
            self.notices
                .push(Notice::Error("Sender address is unknown".into()));
            return None;
        };

        let subject = format!("Re: {}", email.subject.as_deref().unwrap_or(""));
        let url = Url::parse_with_params(
            GMAIL_COMPOSE_URL,
            &[("view", "cm"), ("fs", "1"), ("to", to), ("su", &subject)],
        );
        match url {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(error = %e, "failed to build compose url");
                None
            }
        }
    }

    // --- dialogs and escape ---

    pub fn toggle_command_palette(&mut self) {
        self.command_palette_open = !self.command_palette_open;
        self.sync_keymap();
    }

    pub fn toggle_help(&mut self) {
        self.help_open = !self.help_open;
        self.sync_keymap();
    }

    /// Escape dismisses the topmost layer: dialog, then opened email,
    /// then the selection.
    pub fn escape(&mut self) {
        if self.pending_blacklist.is_some() {
            self.cancel_blacklist();
        } else if self.command_palette_open || self.help_open {
            self.command_palette_open = false;
            self.help_open = false;
            self.sync_keymap();
        } else if self.opened.is_some() {
            self.close_email();
        } else {
            self.selection.clear();
        }
    }

    // --- keyboard dispatch ---

    /// Resolves and applies a keystroke. Returns a compose URL when the
    /// keystroke triggered a reply.
    pub async fn handle_key(&mut self, keystroke: Keystroke) -> Option<Url> {
        let action = self.keymap.resolve(keystroke)?;
        self.apply(action).await
    }

    /// Applies a resolved action.
    pub async fn apply(&mut self, action: Action) -> Option<Url> {
        match action {
            Action::MoveUp => self.move_up(),
            Action::MoveDown => self.move_down(),
            Action::ToggleSelect => self.toggle_select_focused(),
            Action::SelectAll => self.select_all_visible(),
            Action::OpenFocused => self.open_focused(),
            Action::Dismiss => self.dismiss().await,
            Action::Blacklist => self.request_blacklist(),
            Action::Reply => return self.reply(),
            Action::CommandPalette => self.toggle_command_palette(),
            Action::ShowHelp => self.toggle_help(),
            Action::Escape => self.escape(),
        }
        None
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}
