//! Configuration and settings management.
//!
//! Settings are stored in the user's config directory as JSON; secrets
//! are read from the environment instead.

mod settings;

pub use settings::{
    AiSettings, ConfigError, Settings, StoreSettings, AI_API_KEY_ENV, STORE_API_KEY_ENV,
};
