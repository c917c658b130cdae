//! SQLite implementation of the ticket store.
//!
//! One relational table, created idempotently at startup. Enum columns hold
//! the wire strings of the closed enumerations; anything else read back from
//! disk is reported as a storage error rather than coerced into a ticket.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{Classification, Res, Ticket, TicketCategory, TicketPriority, TicketStatus},
};

use super::{GenericTicketStore, TicketStore};

// Extra methods on `TicketStore` applied by the sqlite implementation.

impl TicketStore {
    pub fn sqlite(config: &Config) -> Res<Self> {
        let store = SqliteTicketStore::open(&config.db_path)?;
        Ok(Self { inner: Arc::new(store) })
    }

    /// In-memory variant for tests.
    pub fn sqlite_in_memory() -> Res<Self> {
        let store = SqliteTicketStore::open_in_memory()?;
        Ok(Self { inner: Arc::new(store) })
    }
}

// Specific implementations.

/// Ticket store backed by a single SQLite table.
///
/// Concurrency safety is delegated to the connection mutex and SQLite's own
/// single-row write atomicity; there is no application-level locking beyond
/// that.
pub struct SqliteTicketStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTicketStore {
    /// Open (or create) the ticket database at the given path.
    #[instrument(name = "SqliteTicketStore::open", skip_all)]
    pub fn open(path: &str) -> Res<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };

        store.init_schema()?;
        info!("Ticket database initialized at `{path}`.");

        Ok(store)
    }

    /// Open an in-memory ticket database.
    pub fn open_in_memory() -> Res<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Arc::new(Mutex::new(conn)) };

        store.init_schema()?;

        Ok(store)
    }

    /// Create the tickets table if it does not exist yet.
    fn init_schema(&self) -> Res<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_message TEXT NOT NULL,
                category TEXT NOT NULL,
                priority TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        Ok(())
    }
}

#[async_trait]
impl GenericTicketStore for SqliteTicketStore {
    #[instrument(name = "SqliteTicketStore::insert", skip_all)]
    async fn insert(&self, customer_message: &str, classification: &Classification) -> Res<Ticket> {
        let created_at = Utc::now();
        let status = TicketStatus::Open;

        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO tickets (customer_message, category, priority, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                customer_message,
                classification.category.as_str(),
                classification.priority.as_str(),
                status.as_str(),
                created_at.to_rfc3339(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("Inserted ticket {id}.");

        Ok(Ticket {
            id,
            customer_message: customer_message.to_string(),
            category: classification.category,
            priority: classification.priority,
            status,
            created_at,
        })
    }

    #[instrument(name = "SqliteTicketStore::list_all", skip_all)]
    async fn list_all(&self) -> Res<Vec<Ticket>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare("SELECT id, customer_message, category, priority, status, created_at FROM tickets ORDER BY id ASC")?;
        let rows = stmt.query_map([], read_raw_row)?;

        rows.map(|row| parse_ticket_row(row?)).collect()
    }

    #[instrument(name = "SqliteTicketStore::get", skip(self))]
    async fn get(&self, id: i64) -> Res<Option<Ticket>> {
        let conn = self.conn.lock().unwrap();

        get_ticket(&conn, id)
    }

    #[instrument(name = "SqliteTicketStore::update_status", skip(self))]
    async fn update_status(&self, id: i64, status: TicketStatus) -> Res<Ticket> {
        let conn = self.conn.lock().unwrap();

        let affected = conn.execute("UPDATE tickets SET status = ?1 WHERE id = ?2", params![status.as_str(), id])?;

        if affected == 0 {
            return Err(anyhow::anyhow!("Ticket {id} disappeared during status update."));
        }

        get_ticket(&conn, id)?.ok_or_else(|| anyhow::anyhow!("Ticket {id} disappeared during status update."))
    }
}

/// A row as stored, before the enum columns are parsed.
type RawTicketRow = (i64, String, String, String, String, String);

fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTicketRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?, row.get(5)?))
}

fn get_ticket(conn: &Connection, id: i64) -> Res<Option<Ticket>> {
    let mut stmt = conn.prepare("SELECT id, customer_message, category, priority, status, created_at FROM tickets WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], read_raw_row)?;

    rows.next().map(|row| parse_ticket_row(row?)).transpose()
}

/// Parse the enum and timestamp columns; a value outside the closed sets is
/// a corrupt row and surfaces as a storage error.
fn parse_ticket_row(row: RawTicketRow) -> Res<Ticket> {
    let (id, customer_message, category, priority, status, created_at) = row;

    Ok(Ticket {
        id,
        customer_message,
        category: TicketCategory::from_wire(&category).ok_or_else(|| anyhow::anyhow!("Corrupt category `{category}` on ticket {id}."))?,
        priority: TicketPriority::from_wire(&priority).ok_or_else(|| anyhow::anyhow!("Corrupt priority `{priority}` on ticket {id}."))?,
        status: TicketStatus::from_wire(&status).ok_or_else(|| anyhow::anyhow!("Corrupt status `{status}` on ticket {id}."))?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|err| anyhow::anyhow!("Corrupt created_at `{created_at}` on ticket {id}: {err}"))?
            .with_timezone(&Utc),
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(category: TicketCategory, priority: TicketPriority) -> Classification {
        Classification { category, priority }
    }

    #[tokio::test]
    async fn test_insert_returns_full_record() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        let ticket = store.insert("The app crashes on login.", &classification(TicketCategory::Bug, TicketPriority::High)).await.unwrap();

        assert_eq!(ticket.customer_message, "The app crashes on login.");
        assert_eq!(ticket.category, TicketCategory::Bug);
        assert_eq!(ticket.priority, TicketPriority::High);
        assert_eq!(ticket.status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_insert_preserves_untrimmed_message() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        let ticket = store.insert("  padded message  ", &Classification::default()).await.unwrap();
        let fetched = store.get(ticket.id).await.unwrap().unwrap();

        assert_eq!(fetched.customer_message, "  padded message  ");
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_ascending() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        let a = store.insert("first", &Classification::default()).await.unwrap();
        let b = store.insert("second", &Classification::default()).await.unwrap();
        let c = store.insert("third", &Classification::default()).await.unwrap();

        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_ascending_id() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        for message in ["A", "B", "C"] {
            store.insert(message, &Classification::default()).await.unwrap();
        }

        let tickets = store.list_all().await.unwrap();
        let messages: Vec<&str> = tickets.iter().map(|t| t.customer_message.as_str()).collect();

        assert_eq!(messages, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        assert!(store.get(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_persists_transition() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        let ticket = store.insert("resolve me", &Classification::default()).await.unwrap();
        let updated = store.update_status(ticket.id, TicketStatus::Resolved).await.unwrap();

        assert_eq!(updated.status, TicketStatus::Resolved);

        let fetched = store.get(ticket.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, TicketStatus::Resolved);
    }

    #[tokio::test]
    async fn test_update_status_on_missing_row_is_an_error() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        assert!(store.update_status(42, TicketStatus::Resolved).await.is_err());
    }

    #[tokio::test]
    async fn test_round_trip_is_exact() {
        let store = TicketStore::sqlite_in_memory().unwrap();

        let created = store.insert("round trip", &classification(TicketCategory::Feature, TicketPriority::Low)).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(created, fetched);
        assert_eq!(serde_json::to_string(&created).unwrap(), serde_json::to_string(&fetched).unwrap());
    }
}
