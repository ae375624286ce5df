//! Long-lived workflows built on the providers and the store.

mod draft_session;

pub use draft_session::{DraftContext, DraftSession, GenerationProgress};
