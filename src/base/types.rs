use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Category assigned to a ticket at creation.
///
/// This is a closed set: nothing outside these four variants can be
/// persisted or serialized, no matter what the classifier returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketCategory {
    Bug,
    Feature,
    Billing,
    #[default]
    Uncategorized,
}

impl TicketCategory {
    /// The wire name, as sent over HTTP and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "BUG",
            Self::Feature => "FEATURE",
            Self::Billing => "BILLING",
            Self::Uncategorized => "UNCATEGORIZED",
        }
    }

    /// Parse a wire name; `None` for anything outside the closed set.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "BUG" => Some(Self::Bug),
            "FEATURE" => Some(Self::Feature),
            "BILLING" => Some(Self::Billing),
            "UNCATEGORIZED" => Some(Self::Uncategorized),
            _ => None,
        }
    }
}

/// Priority assigned to a ticket at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketPriority {
    High,
    #[default]
    Normal,
    Low,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "HIGH" => Some(Self::High),
            "NORMAL" => Some(Self::Normal),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Lifecycle state of a ticket.
///
/// Tickets start `Open` and make a single forward transition to `Resolved`.
/// There is no reverse transition and no deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TicketStatus {
    #[default]
    Open,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Resolved => "RESOLVED",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "OPEN" => Some(Self::Open),
            "RESOLVED" => Some(Self::Resolved),
            _ => None,
        }
    }
}

/// A classifier decision for a single customer message.
///
/// `Default` is the fallback decision used whenever the external call cannot
/// be trusted: `{UNCATEGORIZED, NORMAL}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub category: TicketCategory,
    pub priority: TicketPriority,
}

/// A persisted support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique id, assigned by the store on insert.
    pub id: i64,
    /// The raw customer message, stored untrimmed.
    pub customer_message: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    /// UTC creation timestamp, serialized as ISO-8601.
    pub created_at: DateTime<Utc>,
}
