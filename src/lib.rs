//! Library root for `triage-desk`.
//!
//! Triage-desk is a small HTTP service for customer-support ticket intake:
//! - Clients submit a free-text message
//! - The message is classified via an external AI call into a category and priority
//! - The resulting ticket is persisted in a single SQLite table
//! - Endpoints list tickets and mark them resolved
//!
//! The service integrates with OpenAI for classification and SQLite for
//! storage. The architecture is built around extensible traits that allow
//! for different implementations of each service; the classifier's
//! fallback-on-failure contract is total by type, so a broken AI dependency
//! can never fail a ticket submission.

#[warn(missing_docs)]
pub mod base;
pub mod http;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the triage-desk runtime:
/// - Opens the ticket database (creating the schema if absent)
/// - Creates the process-wide classifier client
/// - Binds the HTTP listener and serves requests
pub async fn start(config: Config) -> Void {
    info!("Starting triage-desk ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Serve the HTTP API.
    runtime.serve().await?;

    Ok(())
}
