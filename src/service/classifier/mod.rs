pub mod openai;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Classification;

// Traits.

/// Generic classifier trait that clients must implement.
///
/// This trait defines the single triage operation: turn a customer message
/// into a category/priority decision. Implementing this trait allows
/// different AI providers to be used with triage-desk.
#[async_trait]
pub trait GenericClassifierClient: Send + Sync + 'static {
    /// Classify a customer message into a category/priority decision.
    ///
    /// This is a total function by design: it never returns an error. Any
    /// failure in the external round-trip degrades to the fallback decision
    /// `{UNCATEGORIZED, NORMAL}`, so callers can rely on always receiving a
    /// valid decision. The message is expected to be non-empty; the HTTP
    /// layer validates that before calling.
    async fn classify(&self, message: &str) -> Classification;
}

// Structs.

/// Classifier client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ClassifierClient {
    inner: Arc<dyn GenericClassifierClient>,
}

impl Deref for ClassifierClient {
    type Target = dyn GenericClassifierClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ClassifierClient {
    pub fn new(inner: Arc<dyn GenericClassifierClient>) -> Self {
        Self { inner }
    }
}
