//! Runtime services and shared state for triage-desk.

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    http,
    service::{classifier::ClassifierClient, store::TicketStore},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration, the ticket store, and the classifier
/// client. All handles are process-wide: they are created once at startup and
/// reused across requests. It is designed to be trivially cloneable, allowing
/// it to be passed around (and into axum as state) without the need for
/// `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The ticket store instance.
    pub store: TicketStore,
    /// The classifier client instance.
    pub classifier: ClassifierClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the ticket store.
        let store = TicketStore::sqlite(&config)?;

        // Initialize the classifier client.
        let classifier = ClassifierClient::openai(&config);

        Ok(Self { config, store, classifier })
    }

    /// Bind the listener and serve the HTTP API until shutdown.
    pub async fn serve(&self) -> Void {
        let app = http::router(self.clone());

        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        info!("Listening on http://{}", self.config.listen_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Ok(())
    }
}
