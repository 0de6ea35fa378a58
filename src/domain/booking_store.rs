//! Concurrent booking table.
//!
//! The booked-seat set is always derived from this table on read — it is
//! never cached, so it cannot drift from the ledger's view of capacity.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::booking::{Booking, BookingStatus};
use super::{seat_map, BookingId, EventId, UserId};
use crate::error::CoreError;

fn active_seats(map: &HashMap<BookingId, Booking>, event_id: EventId) -> HashSet<u32> {
    map.values()
        .filter(|b| b.event_id == event_id && b.is_active())
        .filter_map(|b| b.seats.as_ref())
        .flatten()
        .copied()
        .collect()
}

/// In-memory booking table keyed by booking ID.
#[derive(Debug, Default)]
pub struct BookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl BookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new booking.
    pub async fn insert(&self, booking: Booking) {
        let mut map = self.bookings.write().await;
        map.insert(booking.booking_id, booking);
    }

    /// Validates the booking's seats against the live table and inserts
    /// it, all under a single write-lock hold. Racing inserts for the
    /// same seat serialize here, so at most one of them can commit.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SeatConflict`] or [`CoreError::InvalidRequest`]
    /// when validation fails; the table is left untouched.
    pub async fn insert_validated(&self, booking: Booking, capacity: u32) -> Result<(), CoreError> {
        let mut map = self.bookings.write().await;
        if let Some(seats) = &booking.seats {
            let booked = active_seats(&map, booking.event_id);
            seat_map::validate_seats(seats, &booked, booking.quantity, capacity)?;
        }
        map.insert(booking.booking_id, booking);
        Ok(())
    }

    /// Removes a booking. Used only to undo an insert when a later step
    /// of the commit sequence fails.
    pub async fn remove(&self, booking_id: BookingId) -> Option<Booking> {
        self.bookings.write().await.remove(&booking_id)
    }

    /// Returns a clone of the booking.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BookingNotFound`] if no such booking exists.
    pub async fn get(&self, booking_id: BookingId) -> Result<Booking, CoreError> {
        let map = self.bookings.read().await;
        map.get(&booking_id)
            .cloned()
            .ok_or(CoreError::BookingNotFound(*booking_id.as_uuid()))
    }

    /// Marks a booking cancelled. Returns the booking when this call
    /// performed the transition, `None` when it was already cancelled —
    /// the caller releases capacity only on `Some`, which keeps the
    /// release idempotent per booking ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BookingNotFound`] if no such booking exists.
    pub async fn set_cancelled(&self, booking_id: BookingId) -> Result<Option<Booking>, CoreError> {
        let mut map = self.bookings.write().await;
        let booking = map
            .get_mut(&booking_id)
            .ok_or(CoreError::BookingNotFound(*booking_id.as_uuid()))?;
        if booking.status == BookingStatus::Cancelled {
            return Ok(None);
        }
        booking.status = BookingStatus::Cancelled;
        Ok(Some(booking.clone()))
    }

    /// Union of seat numbers across all non-cancelled bookings for an
    /// event. Recomputed on every call.
    pub async fn booked_seats(&self, event_id: EventId) -> HashSet<u32> {
        let map = self.bookings.read().await;
        active_seats(&map, event_id)
    }

    /// All bookings owned by a user, newest first.
    pub async fn bookings_for_user(&self, user_id: UserId) -> Vec<Booking> {
        let map = self.bookings.read().await;
        let mut result: Vec<Booking> = map
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Distinct user IDs holding at least one booking (any status except
    /// cancelled). Used for the `participants` recipient cohort.
    pub async fn distinct_booking_user_ids(&self) -> HashSet<UserId> {
        let map = self.bookings.read().await;
        map.values()
            .filter(|b| b.is_active())
            .map(|b| b.user_id)
            .collect()
    }

    /// Sum of confirmed quantities for an event/ticket-type pair. Test
    /// and diagnostics helper for the conservation invariant.
    pub async fn confirmed_quantity(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
    ) -> u32 {
        let map = self.bookings.read().await;
        map.values()
            .filter(|b| {
                b.event_id == event_id
                    && b.status == BookingStatus::Confirmed
                    && b.ticket_type_id.as_deref() == ticket_type_id
            })
            .map(|b| b.quantity)
            .sum()
    }
}
