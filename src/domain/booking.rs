//! Booking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookingId, EventId, ReservationToken, TicketId, UserId};

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created but not yet confirmed (reserved for future payment flows).
    Pending,
    /// Confirmed; its units are counted against the event's capacity.
    Confirmed,
    /// Cancelled; its units have been released back to the ledger.
    Cancelled,
}

/// A confirmed reservation of one or more capacity units.
///
/// Created atomically with a ledger decrement — a booking never exists
/// without a corresponding reservation token, and cancelling it releases
/// that token exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique booking identifier.
    pub booking_id: BookingId,
    /// Event this booking is for.
    pub event_id: EventId,
    /// Ticket type selected, if the event sells through types.
    pub ticket_type_id: Option<String>,
    /// Number of units booked.
    pub quantity: u32,
    /// Selected seat numbers, when seats apply. Cardinality == `quantity`.
    pub seats: Option<Vec<u32>>,
    /// Current lifecycle state.
    pub status: BookingStatus,
    /// One opaque ticket identifier per unit.
    pub ticket_ids: Vec<TicketId>,
    /// Ledger handle to release on cancellation.
    pub reservation: ReservationToken,
    /// Owner of the booking.
    pub user_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Returns `true` while the booking holds capacity units.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}
