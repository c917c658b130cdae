//! Core components, types, and utilities for triage-desk.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The system directive for the classifier call.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
