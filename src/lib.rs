//! sift - A keyboard-driven triage dashboard for daily email digests
//!
//! This crate provides the core functionality for the sift dashboard:
//! digest loading and filtering, keyboard-driven selection and triage
//! actions, AI draft generation, and the remote store client.

pub mod app;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
pub mod store;

pub use app::Dashboard;
