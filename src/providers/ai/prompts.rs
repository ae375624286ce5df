//! Prompt construction for draft generation.

use super::request::DraftRequest;

/// System prompt shared by every draft generation.
pub const SYSTEM_PROMPT: &str = "\
You are an expert email assistant. You help draft clear, professional email responses.

Your responses are:
- Concise and to the point
- Appropriately formal based on context
- Action-oriented when needed
- Free of unnecessary pleasantries

Rules:
- Never include email headers (To:, From:, Subject:, Date:)
- Never include email signatures (Best regards, Sincerely, etc.) unless the email context suggests one is expected
- Never include subject lines
- Write the body of the email only
- Match the language of the original email (e.g., respond in German if the email is in German)";

/// Builds the user prompt from structured request fields. Tone lands as
/// a numbered instruction so it varies independently of the content.
pub fn build_draft_prompt(request: &DraftRequest) -> String {
    let sender_name = request
        .sender_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("Unknown Sender");
    let user_name = request
        .user_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or("the user");
    let snippet = request.snippet.as_deref().unwrap_or("");

    format!(
        "You are drafting an email response on behalf of {user_name}.

ORIGINAL EMAIL:
From: {sender_name} <{sender_email}>
Subject: {subject}
Category: {category}
Priority: {priority}

Email Preview:
{snippet}

INSTRUCTIONS:
1. {tone_instruction}
2. Address the sender by their first name if appropriate for the context
3. Respond to the key points mentioned in the email preview
4. Keep the response focused and actionable
5. Match the language of the original email
6. Do NOT include a subject line - just the body
7. Do NOT include email headers or signatures
8. Write naturally as if {user_name} is writing

Draft a concise, helpful response:",
        sender_email = request.sender_email,
        subject = request.subject,
        category = request.category,
        priority = request.priority,
        tone_instruction = request.tone.instruction(),
    )
}
