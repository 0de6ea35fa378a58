//! Booking transaction coordinator.
//!
//! Commit sequence for a new booking: validate, reserve capacity
//! (authoritative scarce resource, always first), then re-validate seats
//! and insert in one booking-table critical section so racing requests
//! for the same seat serialize. Any failure after the reserve issues a
//! compensating release, so a failed booking can never strand capacity.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{
    seat_map, Booking, BookingId, BookingStatus, BookingStore, CapacityLedger, EventId, TicketId,
    UserId,
};
use crate::error::CoreError;
use crate::persistence::RecordArchive;
use crate::service::WaitlistService;

/// Parameters for a booking attempt.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    /// Event to book against.
    pub event_id: EventId,
    /// Ticket type, required when the event sells through types.
    pub ticket_type_id: Option<String>,
    /// Number of units requested.
    pub quantity: u32,
    /// Specific seats, when the caller selected them client-side. Always
    /// re-validated server-side at commit time.
    pub seats: Option<Vec<u32>>,
    /// Booking owner.
    pub user_id: UserId,
}

/// Orchestrates the check-then-commit booking sequence.
#[derive(Debug, Clone)]
pub struct BookingService {
    ledger: Arc<CapacityLedger>,
    bookings: Arc<BookingStore>,
    waitlist: Arc<WaitlistService>,
    archive: Option<Arc<dyn RecordArchive>>,
    max_per_booking: u32,
}

impl BookingService {
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(
        ledger: Arc<CapacityLedger>,
        bookings: Arc<BookingStore>,
        waitlist: Arc<WaitlistService>,
        archive: Option<Arc<dyn RecordArchive>>,
        max_per_booking: u32,
    ) -> Self {
        Self {
            ledger,
            bookings,
            waitlist,
            archive,
            max_per_booking,
        }
    }

    /// Returns the booking store (read access for handlers).
    #[must_use]
    pub fn bookings(&self) -> &Arc<BookingStore> {
        &self.bookings
    }

    /// Returns the capacity ledger.
    #[must_use]
    pub fn ledger(&self) -> &Arc<CapacityLedger> {
        &self.ledger
    }

    /// Creates a confirmed booking.
    ///
    /// Capacity is reserved before seats are validated; on any later
    /// failure the reservation is released so two racing requests can
    /// never both hold phantom units. Errors are terminal — the caller
    /// decides whether to resubmit with different parameters.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidRequest`] for a bad quantity, a missing or
    ///   unknown ticket type, or seats on a seatless event.
    /// - [`CoreError::InsufficientCapacity`] when the event/type cannot
    ///   cover the quantity ("sold out").
    /// - [`CoreError::SeatConflict`] when a requested seat is taken.
    /// - [`CoreError::PersistenceError`] when the archive write failed;
    ///   the reservation has already been released.
    pub async fn create_booking(&self, req: CreateBooking) -> Result<Booking, CoreError> {
        if req.quantity == 0 {
            return Err(CoreError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        if req.quantity > self.max_per_booking {
            return Err(CoreError::InvalidRequest(format!(
                "quantity exceeds the per-booking maximum of {}",
                self.max_per_booking
            )));
        }

        let token = self
            .ledger
            .reserve(req.event_id, req.ticket_type_id.as_deref(), req.quantity)
            .await?;

        let booking = Booking {
            booking_id: BookingId::new(),
            event_id: req.event_id,
            ticket_type_id: req.ticket_type_id.clone(),
            quantity: req.quantity,
            seats: req.seats.clone(),
            status: BookingStatus::Confirmed,
            ticket_ids: (0..req.quantity).map(|_| TicketId::new()).collect(),
            reservation: token,
            user_id: req.user_id,
            created_at: Utc::now(),
        };
        if let Err(e) = self.commit(&booking).await {
            // Seat errors are user-correctable; give the units back
            // immediately rather than holding a phantom reservation.
            let _ = self.ledger.release(token).await;
            return Err(e);
        }

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.archive_booking(&booking).await {
                // Compensating action: undo the insert and the reserve so
                // no phantom capacity loss survives the failure.
                let _ = self.bookings.remove(booking.booking_id).await;
                let _ = self.ledger.release(token).await;
                tracing::error!(booking_id = %booking.booking_id, error = %e, "archive failed; reservation released");
                return Err(e);
            }
        }

        self.waitlist
            .note_conversion(req.event_id, req.ticket_type_id.as_deref(), req.user_id)
            .await;

        tracing::info!(
            booking_id = %booking.booking_id,
            event_id = %req.event_id,
            quantity = req.quantity,
            "booking confirmed"
        );
        Ok(booking)
    }

    /// Cancels a booking.
    ///
    /// Idempotent: a second cancel of the same booking releases nothing.
    /// When units are actually freed, waitlist promotion is evaluated for
    /// the affected event/ticket-type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BookingNotFound`] for an unknown booking.
    pub async fn cancel_booking(&self, booking_id: BookingId) -> Result<(), CoreError> {
        let Some(booking) = self.bookings.set_cancelled(booking_id).await? else {
            return Ok(()); // already cancelled
        };

        if let Some(archive) = &self.archive {
            // The live tables already reflect the cancel; an archive miss
            // here is logged, not surfaced.
            if let Err(e) = archive.mark_booking_cancelled(&booking).await {
                tracing::warn!(booking_id = %booking_id, error = %e, "archive cancel failed");
            }
        }

        if let Some((event_id, ticket_type_id, freed)) =
            self.ledger.release(booking.reservation).await
        {
            tracing::info!(%booking_id, %event_id, freed, "booking cancelled");
            self.waitlist
                .on_capacity_freed(event_id, ticket_type_id.as_deref(), freed)
                .await;
        }
        Ok(())
    }

    /// The derived booked-seat set for an event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EventNotFound`] for an unknown event.
    pub async fn booked_seats(&self, event_id: EventId) -> Result<Vec<u32>, CoreError> {
        // Touch the ledger so unknown events 404 rather than reading as empty.
        let _ = self.ledger.capacity_of(event_id).await?;
        let mut seats: Vec<u32> = self
            .bookings
            .booked_seats(event_id)
            .await
            .into_iter()
            .collect();
        seats.sort_unstable();
        Ok(seats)
    }

    /// The deterministic seat layout for an event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EventNotFound`] for an unknown event or
    /// [`CoreError::InvalidRequest`] when the event has no fixed capacity.
    pub async fn seat_layout(&self, event_id: EventId) -> Result<Vec<Vec<u32>>, CoreError> {
        let capacity = self.ledger.capacity_of(event_id).await?.ok_or_else(|| {
            CoreError::InvalidRequest("event has unlimited ticketing; seats do not apply".to_string())
        })?;
        Ok(seat_map::layout(capacity, seat_map::DEFAULT_COLUMNS))
    }

    /// Inserts the booking into the table. A seated booking goes through
    /// [`BookingStore::insert_validated`], which re-checks its seats and
    /// inserts under a single write-lock hold; a seatless one inserts
    /// directly.
    async fn commit(&self, booking: &Booking) -> Result<(), CoreError> {
        if booking.seats.is_some() {
            let capacity = self
                .ledger
                .capacity_of(booking.event_id)
                .await?
                .ok_or_else(|| {
                    CoreError::InvalidRequest(
                        "event has unlimited ticketing; seats do not apply".to_string(),
                    )
                })?;
            self.bookings.insert_validated(booking.clone(), capacity).await
        } else {
            self.bookings.insert(booking.clone()).await;
            Ok(())
        }
    }
}
