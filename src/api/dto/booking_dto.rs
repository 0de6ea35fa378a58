//! Booking DTOs for create, cancel, and seat-read operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus};

/// Request body for `POST /bookings`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    /// Event to book against.
    pub event_id: Uuid,
    /// Ticket type, required when the event sells through types.
    #[serde(default)]
    pub ticket_type_id: Option<String>,
    /// Number of units requested.
    pub quantity: u32,
    /// Client-selected seat numbers; re-validated server-side.
    #[serde(default)]
    pub seats: Option<Vec<u32>>,
}

/// A booking as returned to the caller.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// Booking identifier.
    pub booking_id: Uuid,
    /// Event booked against.
    pub event_id: Uuid,
    /// Ticket type, if any.
    pub ticket_type_id: Option<String>,
    /// Units booked.
    pub quantity: u32,
    /// Assigned seats, when seats apply.
    pub seats: Option<Vec<u32>>,
    /// Lifecycle state.
    pub status: BookingStatus,
    /// One opaque ticket identifier per unit.
    pub ticket_ids: Vec<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            booking_id: *booking.booking_id.as_uuid(),
            event_id: *booking.event_id.as_uuid(),
            ticket_type_id: booking.ticket_type_id,
            quantity: booking.quantity,
            seats: booking.seats,
            status: booking.status,
            ticket_ids: booking.ticket_ids.iter().map(|t| *t.as_uuid()).collect(),
            created_at: booking.created_at,
        }
    }
}

/// Response for `GET /bookings/event/:id/seats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookedSeatsResponse {
    /// Seat numbers held by non-cancelled bookings, ascending.
    pub booked_seats: Vec<u32>,
}

/// Response for `GET /bookings/event/:id/layout`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SeatLayoutResponse {
    /// Rows of seat numbers, row-major, last row possibly partial.
    pub rows: Vec<Vec<u32>>,
}
