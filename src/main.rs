//! sift - Entry point for the triage dashboard
//!
//! `sift` loads today's digest and prints a priority summary;
//! `sift draft <email-id>` streams a reply draft for one of today's
//! emails to stdout and saves it as pending.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use sift::app::DateCursor;
use sift::config::{Settings, AI_API_KEY_ENV, STORE_API_KEY_ENV};
use sift::providers::ai::AnthropicDraftProvider;
use sift::services::{DraftContext, DraftSession, GenerationProgress};
use sift::store::{RestStore, TriageStore};
use sift::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting sift");

    let settings = Settings::load().context("failed to load settings")?;
    if settings.store.url.is_empty() {
        anyhow::bail!("store.url is not configured; edit the settings file");
    }
    let store_key = std::env::var(STORE_API_KEY_ENV)
        .with_context(|| format!("{STORE_API_KEY_ENV} is not set"))?;

    // Constructed once and shared; nothing downstream builds clients.
    let store = Arc::new(RestStore::new(settings.store.url.clone(), store_key));

    let mut dashboard = Dashboard::new(store.clone(), DateCursor::today());
    dashboard.load().await;

    if let Some(error) = dashboard.load_error() {
        anyhow::bail!("{error}");
    }

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("draft") => {
            let email_id = args.next().context("usage: sift draft <email-id>")?;
            draft_reply(&settings, &dashboard, store.as_ref(), &email_id).await
        }
        Some(other) => anyhow::bail!("unknown command: {other}"),
        None => {
            print_summary(&dashboard);
            Ok(())
        }
    }
}

fn print_summary(dashboard: &Dashboard) {
    tracing::info!(
        date = %dashboard.date().selected(),
        emails = dashboard.visible().len(),
        pending_drafts = dashboard.pending_drafts().len(),
        "digest loaded"
    );
    for group in &dashboard.groups() {
        tracing::info!(
            priority = group.priority.label(),
            count = group.emails.len(),
            "priority group"
        );
    }
}

/// Streams a reply draft for one of today's emails to stdout, then
/// saves it as a pending draft.
async fn draft_reply(
    settings: &Settings,
    dashboard: &Dashboard,
    store: &dyn TriageStore,
    email_id: &str,
) -> anyhow::Result<()> {
    let api_key = std::env::var(AI_API_KEY_ENV)
        .with_context(|| format!("{AI_API_KEY_ENV} is not set"))?;
    let provider = AnthropicDraftProvider::new(api_key)
        .with_model(settings.ai.model.clone())
        .with_max_tokens(settings.ai.max_tokens)
        .with_temperature(settings.ai.temperature);

    let email = dashboard
        .visible()
        .iter()
        .find(|e| e.id.0 == email_id)
        .with_context(|| format!("no email {email_id} in today's digest"))?;
    let sender_email = email
        .sender_email
        .clone()
        .context("email has no sender address")?;
    let subject = email.subject.clone().context("email has no subject")?;

    let mut session = DraftSession::new(
        DraftContext {
            email_id: email.gmail_id.clone(),
            sender_name: email.sender.clone(),
            sender_email,
            subject,
            snippet: email.snippet.clone(),
            category: email.category,
            priority: email.priority,
            user_name: settings.user_name.clone(),
        },
        settings.tone,
    );

    session.generate(&provider, None).await;
    if let Some(error) = session.error() {
        anyhow::bail!("{error}");
    }

    let mut printed = 0;
    loop {
        match session.pump().await {
            GenerationProgress::Streamed => {
                let text = session.completion();
                print!("{}", &text[printed..]);
                std::io::stdout().flush()?;
                printed = text.len();
            }
            GenerationProgress::Finished => break,
            GenerationProgress::Failed | GenerationProgress::Idle => {
                anyhow::bail!(
                    "{}",
                    session.error().unwrap_or("draft generation failed")
                );
            }
        }
    }
    println!();

    if !session.save(store).await {
        anyhow::bail!("{}", session.error().unwrap_or("failed to save draft"));
    }
    tracing::info!(email_id, "draft saved as pending");
    Ok(())
}
