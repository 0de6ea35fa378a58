//! Event records and ticket types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventId;

/// One sellable ticket category within an event.
///
/// `available` is the live counter mutated only by the capacity ledger;
/// it always stays within `[0, quantity]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    /// Stable identifier unique within the event (e.g. `"general"`).
    pub type_id: String,
    /// Display name (e.g. `"General Admission"`).
    pub name: String,
    /// Price per unit in cents.
    pub price_cents: u64,
    /// Total units ever sellable for this type (immutable after creation).
    pub quantity: u32,
    /// Units currently available for reservation.
    pub available: u32,
}

impl TicketType {
    /// Creates a ticket type with all units available.
    #[must_use]
    pub fn new(type_id: impl Into<String>, name: impl Into<String>, price_cents: u64, quantity: u32) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            price_cents,
            quantity,
            available: quantity,
        }
    }
}

/// An event as registered with the capacity ledger.
///
/// Exactly one of the two capacity models applies: a flat `capacity`
/// (with `ticket_types` empty) or per-type quantities (with `capacity`
/// set to the sum of type quantities for seat-map sizing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Display name.
    pub name: String,
    /// Flat capacity, or the sum of type quantities for typed events.
    /// `None` means ticketing is unlimited and seats do not apply.
    pub capacity: Option<u32>,
    /// Per-type inventory. Empty for flat-capacity events.
    pub ticket_types: Vec<TicketType>,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    /// Creates a flat-capacity event.
    #[must_use]
    pub fn flat(name: impl Into<String>, capacity: Option<u32>) -> Self {
        Self {
            event_id: EventId::new(),
            name: name.into(),
            capacity,
            ticket_types: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Creates an event with per-type inventory. Overall capacity is the
    /// sum of type quantities, used for seat-map sizing.
    #[must_use]
    pub fn with_types(name: impl Into<String>, ticket_types: Vec<TicketType>) -> Self {
        let capacity = ticket_types.iter().map(|t| t.quantity).sum();
        Self {
            event_id: EventId::new(),
            name: name.into(),
            capacity: Some(capacity),
            ticket_types,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` if this event sells through ticket types rather
    /// than a flat counter.
    #[must_use]
    pub fn has_ticket_types(&self) -> bool {
        !self.ticket_types.is_empty()
    }
}
