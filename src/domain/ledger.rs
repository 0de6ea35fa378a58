//! Capacity ledger: the single mutation path for event inventory.
//!
//! [`CapacityLedger`] stores every event's live counters in a `HashMap`
//! where each entry is individually protected by a [`tokio::sync::RwLock`].
//! All reserve/release decisions happen under the per-event write lock, so
//! the check and the decrement are one atomic step: two concurrent requests
//! can never both observe sufficient capacity and both commit.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::event::EventRecord;
use super::{EventId, ReservationToken};
use crate::error::CoreError;

/// Sentinel availability for events with unlimited ticketing.
pub const UNLIMITED: u32 = u32::MAX;

/// An event's live inventory state behind its per-event lock.
#[derive(Debug)]
pub struct EventCapacity {
    /// The registered event, including per-type `available` counters.
    pub record: EventRecord,
    /// Remaining units for flat-capacity events. `None` when the event
    /// sells through ticket types or is unlimited.
    flat_available: Option<u32>,
}

impl EventCapacity {
    fn new(record: EventRecord) -> Self {
        let flat_available = if record.has_ticket_types() {
            None
        } else {
            record.capacity
        };
        Self {
            record,
            flat_available,
        }
    }

    /// Units currently available for the given ticket type (or the flat
    /// counter when `ticket_type_id` is `None`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the type selector does not
    /// match the event's capacity model.
    pub fn available_for(&self, ticket_type_id: Option<&str>) -> Result<u32, CoreError> {
        match (ticket_type_id, self.record.has_ticket_types()) {
            (Some(type_id), true) => self
                .record
                .ticket_types
                .iter()
                .find(|t| t.type_id == type_id)
                .map(|t| t.available)
                .ok_or_else(|| {
                    CoreError::InvalidRequest(format!("unknown ticket type: {type_id}"))
                }),
            (None, true) => Err(CoreError::InvalidRequest(
                "event sells ticket types; a ticket_type_id is required".to_string(),
            )),
            (Some(_), false) => Err(CoreError::InvalidRequest(
                "event has no ticket types".to_string(),
            )),
            (None, false) => Ok(self.flat_available.unwrap_or(UNLIMITED)),
        }
    }
}

/// Internal record of one capacity decrement, kept until released.
#[derive(Debug, Clone)]
struct Reservation {
    event_id: EventId,
    ticket_type_id: Option<String>,
    quantity: u32,
    released: bool,
}

/// Central store for event inventory with per-event fine-grained locking.
///
/// # Concurrency
///
/// - Reads on the same event are concurrent.
/// - Reserve/release on different events are concurrent.
/// - Reserve/release on the same event are serialized by the entry lock,
///   which is what makes compare-and-decrement atomic.
#[derive(Debug, Default)]
pub struct CapacityLedger {
    events: RwLock<HashMap<EventId, Arc<RwLock<EventCapacity>>>>,
    reservations: RwLock<HashMap<ReservationToken, Reservation>>,
}

impl CapacityLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new event with the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if an event with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn register_event(&self, record: EventRecord) -> Result<EventId, CoreError> {
        let event_id = record.event_id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(CoreError::InvalidRequest(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(EventCapacity::new(record))));
        tracing::info!(%event_id, "event registered");
        Ok(event_id)
    }

    /// Returns the entry for an event behind its per-event lock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EventNotFound`] if no such event exists.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<EventCapacity>>, CoreError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or(CoreError::EventNotFound(*event_id.as_uuid()))
    }

    /// Returns the event's total capacity for seat-map sizing.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EventNotFound`] if no such event exists.
    pub async fn capacity_of(&self, event_id: EventId) -> Result<Option<u32>, CoreError> {
        let entry = self.get(event_id).await?;
        let guard = entry.read().await;
        Ok(guard.record.capacity)
    }

    /// Atomically reserves `quantity` units against an event.
    ///
    /// The availability check and the decrement happen under the same
    /// per-event write lock. On success the returned token must later be
    /// passed to [`Self::release`] (exactly-once; extra calls are no-ops).
    ///
    /// # Errors
    ///
    /// - [`CoreError::EventNotFound`] for an unknown event.
    /// - [`CoreError::InvalidRequest`] for a zero quantity, a missing
    ///   ticket type on a typed event, or an unknown ticket type.
    /// - [`CoreError::InsufficientCapacity`] when the read value no longer
    ///   covers the requested quantity.
    pub async fn reserve(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
        quantity: u32,
    ) -> Result<ReservationToken, CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        let entry = self.get(event_id).await?;
        let mut guard = entry.write().await;

        let available = guard.available_for(ticket_type_id)?;
        if available != UNLIMITED {
            if available < quantity {
                return Err(CoreError::InsufficientCapacity {
                    requested: quantity,
                    available,
                });
            }
            // Commit the decrement while still holding the write lock.
            Self::apply_delta(&mut guard, ticket_type_id, -(i64::from(quantity)));
        }
        drop(guard);

        let token = ReservationToken::new();
        self.reservations.write().await.insert(
            token,
            Reservation {
                event_id,
                ticket_type_id: ticket_type_id.map(str::to_string),
                quantity,
                released: false,
            },
        );
        tracing::debug!(%event_id, ?ticket_type_id, quantity, %token, "capacity reserved");
        Ok(token)
    }

    /// Releases a reservation, crediting its units back to the event.
    ///
    /// Idempotent: unknown or already-released tokens are a no-op. Returns
    /// the `(event_id, ticket_type_id, quantity)` of the reservation when
    /// this call actually freed units, so callers can trigger waitlist
    /// promotion for exactly the freed inventory.
    pub async fn release(
        &self,
        token: ReservationToken,
    ) -> Option<(EventId, Option<String>, u32)> {
        let reservation = {
            let mut map = self.reservations.write().await;
            match map.get_mut(&token) {
                Some(r) if !r.released => {
                    r.released = true;
                    r.clone()
                }
                _ => return None,
            }
        };

        // The event may have been dropped; the release is still consumed.
        if let Ok(entry) = self.get(reservation.event_id).await {
            let mut guard = entry.write().await;
            Self::apply_delta(
                &mut guard,
                reservation.ticket_type_id.as_deref(),
                i64::from(reservation.quantity),
            );
        }
        tracing::debug!(event_id = %reservation.event_id, quantity = reservation.quantity, %token, "capacity released");
        Some((
            reservation.event_id,
            reservation.ticket_type_id,
            reservation.quantity,
        ))
    }

    /// Units currently available for an event/ticket-type pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EventNotFound`] or [`CoreError::InvalidRequest`]
    /// per [`EventCapacity::available_for`].
    pub async fn available_units(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
    ) -> Result<u32, CoreError> {
        let entry = self.get(event_id).await?;
        let guard = entry.read().await;
        guard.available_for(ticket_type_id)
    }

    /// Applies a signed delta to the relevant counter, clamped to
    /// `[0, quantity]` (flat: `[0, capacity]`).
    fn apply_delta(guard: &mut EventCapacity, ticket_type_id: Option<&str>, delta: i64) {
        if let Some(type_id) = ticket_type_id {
            if let Some(tt) = guard
                .record
                .ticket_types
                .iter_mut()
                .find(|t| t.type_id == type_id)
            {
                let next = i64::from(tt.available) + delta;
                tt.available = next.clamp(0, i64::from(tt.quantity)) as u32;
            }
        } else if let Some(flat) = guard.flat_available.as_mut() {
            let cap = guard.record.capacity.unwrap_or(u32::MAX);
            let next = i64::from(*flat) + delta;
            *flat = next.clamp(0, i64::from(cap)) as u32;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::event::TicketType;

    async fn flat_event(ledger: &CapacityLedger, capacity: u32) -> EventId {
        let record = EventRecord::flat("Meetup", Some(capacity));
        match ledger.register_event(record).await {
            Ok(id) => id,
            Err(e) => panic!("register failed: {e}"),
        }
    }

    async fn typed_event(ledger: &CapacityLedger) -> EventId {
        let record = EventRecord::with_types(
            "Concert",
            vec![
                TicketType::new("general", "General", 2500, 5),
                TicketType::new("vip", "VIP", 9000, 2),
            ],
        );
        match ledger.register_event(record).await {
            Ok(id) => id,
            Err(e) => panic!("register failed: {e}"),
        }
    }

    #[tokio::test]
    async fn reserve_decrements_available() {
        let ledger = CapacityLedger::new();
        let event_id = flat_event(&ledger, 10).await;

        let token = ledger.reserve(event_id, None, 3).await;
        assert!(token.is_ok());
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(7));
    }

    #[tokio::test]
    async fn reserve_fails_when_capacity_short() {
        let ledger = CapacityLedger::new();
        let event_id = flat_event(&ledger, 2).await;

        let result = ledger.reserve(event_id, None, 3).await;
        let Err(CoreError::InsufficientCapacity {
            requested,
            available,
        }) = result
        else {
            panic!("expected InsufficientCapacity");
        };
        assert_eq!(requested, 3);
        assert_eq!(available, 2);
        // Failed reserve must not consume anything.
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(2));
    }

    #[tokio::test]
    async fn typed_event_requires_ticket_type() {
        let ledger = CapacityLedger::new();
        let event_id = typed_event(&ledger).await;

        let result = ledger.reserve(event_id, None, 1).await;
        assert!(matches!(result, Err(CoreError::InvalidRequest(_))));

        let ok = ledger.reserve(event_id, Some("vip"), 2).await;
        assert!(ok.is_ok());
        assert_eq!(
            ledger.available_units(event_id, Some("vip")).await.ok(),
            Some(0)
        );
        assert_eq!(
            ledger.available_units(event_id, Some("general")).await.ok(),
            Some(5)
        );
    }

    #[tokio::test]
    async fn unknown_ticket_type_is_rejected() {
        let ledger = CapacityLedger::new();
        let event_id = typed_event(&ledger).await;
        let result = ledger.reserve(event_id, Some("backstage"), 1).await;
        assert!(matches!(result, Err(CoreError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let ledger = CapacityLedger::new();
        let event_id = flat_event(&ledger, 5).await;

        let Ok(token) = ledger.reserve(event_id, None, 2).await else {
            panic!("reserve failed");
        };
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(3));

        let first = ledger.release(token).await;
        assert_eq!(first, Some((event_id, None, 2)));
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(5));

        // Second release never double-credits.
        let second = ledger.release(token).await;
        assert_eq!(second, None);
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(5));
    }

    #[tokio::test]
    async fn release_of_unknown_token_is_noop() {
        let ledger = CapacityLedger::new();
        assert_eq!(ledger.release(ReservationToken::new()).await, None);
    }

    #[tokio::test]
    async fn unlimited_event_always_reserves() {
        let ledger = CapacityLedger::new();
        let record = EventRecord::flat("Open house", None);
        let Ok(event_id) = ledger.register_event(record).await else {
            panic!("register failed");
        };
        for _ in 0..100 {
            assert!(ledger.reserve(event_id, None, 10).await.is_ok());
        }
        assert_eq!(
            ledger.available_units(event_id, None).await.ok(),
            Some(UNLIMITED)
        );
    }

    #[tokio::test]
    async fn concurrent_reserves_never_oversell() {
        let ledger = Arc::new(CapacityLedger::new());
        let event_id = flat_event(&ledger, 5).await;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.reserve(event_id, None, 1).await
            }));
        }

        let mut successes = 0;
        let mut failures = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => successes += 1,
                Ok(Err(CoreError::InsufficientCapacity { .. })) => failures += 1,
                Ok(Err(e)) => panic!("unexpected error: {e}"),
                Err(e) => panic!("join error: {e}"),
            }
        }
        assert_eq!(successes, 5);
        assert_eq!(failures, 15);
        assert_eq!(ledger.available_units(event_id, None).await.ok(), Some(0));
    }
}
