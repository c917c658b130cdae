pub mod sqlite;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Classification, Res, Ticket, TicketStatus};

// Traits.

/// Generic ticket store trait that backends must implement.
///
/// This trait defines the persistence operations for tickets. Implementing
/// this trait allows different storage backends to be used with triage-desk.
#[async_trait]
pub trait GenericTicketStore: Send + Sync + 'static {
    /// Insert a new ticket and return the full persisted record.
    ///
    /// The ticket is created with `status = OPEN`, a fresh UTC timestamp,
    /// and a unique id assigned by the backend. The message is stored as
    /// received, untrimmed.
    async fn insert(&self, customer_message: &str, classification: &Classification) -> Res<Ticket>;

    /// List every ticket, ordered by ascending id (stable creation order).
    ///
    /// An empty store yields an empty vector, not an error.
    async fn list_all(&self) -> Res<Vec<Ticket>>;

    /// Look up a single ticket by id.
    ///
    /// Absence is `Ok(None)`, distinct from a storage failure, so callers
    /// can map it to a 404 response.
    async fn get(&self, id: i64) -> Res<Option<Ticket>>;

    /// Transition a ticket's status and return the updated record.
    ///
    /// This is an unconditional write; the caller is responsible for
    /// checking the current status first (the resolve endpoint enforces the
    /// OPEN -> RESOLVED transition rule).
    async fn update_status(&self, id: i64, status: TicketStatus) -> Res<Ticket>;
}

// Structs.

/// Ticket store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TicketStore {
    inner: Arc<dyn GenericTicketStore>,
}

impl Deref for TicketStore {
    type Target = dyn GenericTicketStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TicketStore {
    pub fn new(inner: Arc<dyn GenericTicketStore>) -> Self {
        Self { inner }
    }
}
