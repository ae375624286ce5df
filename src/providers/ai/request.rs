//! Structured draft generation request and its validation rules.
//!
//! Context travels as separate fields, never a pre-flattened prompt
//! string, so the prompt builder can vary tone instructions
//! independently of content. Validation mirrors the generation
//! endpoint's schema and rejects malformed input with field-level
//! messages before anything goes over the wire.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::traits::{DraftError, DraftResult, FieldError};
use crate::domain::{Category, Priority};

const MAX_SENDER_NAME: usize = 200;
const MAX_SUBJECT: usize = 500;
const MAX_SNIPPET: usize = 5000;
const MAX_USER_NAME: usize = 100;

/// Requested voice for the drafted reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    Friendly,
    Concise,
}

impl Tone {
    /// Prompt instruction for this tone.
    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => "Use a professional, business-appropriate tone.",
            Tone::Friendly => "Use a warm, friendly but still professional tone.",
            Tone::Concise => "Be extremely brief and to the point. Minimize pleasantries.",
        }
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Concise => "concise",
        };
        f.write_str(s)
    }
}

/// Structured context for one draft generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftRequest {
    /// Sender display name; blank falls back to "Unknown Sender".
    #[serde(default)]
    pub sender_name: Option<String>,
    /// Sender address. Required and must look like an email address.
    pub sender_email: String,
    /// Subject of the email being answered. Required, at most 500 chars.
    pub subject: String,
    /// Preview text of the email being answered.
    #[serde(default)]
    pub snippet: Option<String>,
    pub category: Category,
    pub priority: Priority,
    /// Name the reply is written on behalf of.
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub tone: Tone,
}

impl DraftRequest {
    /// Checks every field against the endpoint's schema, collecting all
    /// violations rather than stopping at the first.
    pub fn validate(&self) -> DraftResult<()> {
        let mut details = Vec::new();

        if self.sender_email.is_empty() {
            details.push(FieldError {
                field: "sender_email",
                message: "Required".into(),
            });
        } else if !looks_like_email(&self.sender_email) {
            details.push(FieldError {
                field: "sender_email",
                message: "Invalid email format".into(),
            });
        }

        if self.subject.is_empty() {
            details.push(FieldError {
                field: "subject",
                message: "Subject is required".into(),
            });
        } else if self.subject.chars().count() > MAX_SUBJECT {
            details.push(FieldError {
                field: "subject",
                message: format!("Must be at most {MAX_SUBJECT} characters"),
            });
        }

        if let Some(snippet) = &self.snippet {
            if snippet.chars().count() > MAX_SNIPPET {
                details.push(FieldError {
                    field: "snippet",
                    message: format!("Must be at most {MAX_SNIPPET} characters"),
                });
            }
        }

        if let Some(name) = &self.sender_name {
            if name.chars().count() > MAX_SENDER_NAME {
                details.push(FieldError {
                    field: "sender_name",
                    message: format!("Must be at most {MAX_SENDER_NAME} characters"),
                });
            }
        }

        if let Some(name) = &self.user_name {
            if name.chars().count() > MAX_USER_NAME {
                details.push(FieldError {
                    field: "user_name",
                    message: format!("Must be at most {MAX_USER_NAME} characters"),
                });
            }
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(DraftError::Validation { details })
        }
    }
}

/// Minimal address shape check: one `@`, non-empty local part, and a
/// dotted domain.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    let Some((head, tail)) = domain.rsplit_once('.') else {
        return false;
    };
    !head.is_empty() && !tail.is_empty() && !domain.contains('@') && !value.contains(' ')
}
