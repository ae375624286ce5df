//! External service providers.

pub mod ai;
