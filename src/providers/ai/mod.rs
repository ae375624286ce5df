//! AI draft generation providers.

mod anthropic;
mod prompts;
mod request;
mod traits;

pub use anthropic::{AnthropicDraftProvider, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
pub use prompts::{build_draft_prompt, SYSTEM_PROMPT};
pub use request::{DraftRequest, Tone};
pub use traits::{
    DraftError, DraftProvider, DraftResult, FieldError, GenerationChunk, GenerationStream,
};
