//! Service integrations for external APIs and storage.
//!
//! This module contains implementations for the services used by triage-desk:
//! - The classifier (e.g., OpenAI)
//! - The ticket store (e.g., SQLite)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod classifier;
pub mod store;
