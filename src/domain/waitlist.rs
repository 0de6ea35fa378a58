//! Waitlist entries and the promotion queue.
//!
//! State machine per entry: `Waiting -> Notified -> {Converted | Expired}`,
//! with a voluntary `Left` exit from either non-terminal state. Promotion is
//! strictly FIFO by creation time; a queue position is a read-time projection
//! over the `Waiting` entries, never stored.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{EntryId, EventId, UserId};
use crate::error::CoreError;

/// Lifecycle state of a waitlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistStatus {
    /// Queued, waiting for capacity to free up.
    Waiting,
    /// Selected by promotion; holds a booking window until `expires_at`.
    Notified,
    /// The notification window lapsed without a booking. Terminal.
    Expired,
    /// The user completed a booking inside the window. Terminal.
    Converted,
    /// The user left the waitlist voluntarily. Terminal.
    Left,
}

/// One user's place in an event's waitlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEntry {
    /// Unique entry identifier.
    pub entry_id: EntryId,
    /// Event the user is queued for.
    pub event_id: EventId,
    /// Ticket type the user wants, if the event sells through types.
    pub ticket_type_id: Option<String>,
    /// Units the user wants. Promotion only selects entries whose
    /// quantity fits within the freed amount.
    pub quantity: u32,
    /// Current lifecycle state.
    pub status: WaitlistStatus,
    /// Owner of the entry.
    pub user_id: UserId,
    /// Join timestamp; the FIFO ordering key.
    pub created_at: DateTime<Utc>,
    /// When the entry was promoted, if ever.
    pub notified_at: Option<DateTime<Utc>>,
    /// Promotion deadline: `notified_at + expiry window`.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Concurrent waitlist table with FIFO promotion.
#[derive(Debug)]
pub struct WaitlistStore {
    entries: RwLock<HashMap<EntryId, WaitlistEntry>>,
    expiry_window: Duration,
}

impl WaitlistStore {
    /// Creates an empty store with the given notification window.
    #[must_use]
    pub fn new(expiry_window: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiry_window,
        }
    }

    /// Appends a new `Waiting` entry to the queue.
    pub async fn join(
        &self,
        event_id: EventId,
        ticket_type_id: Option<String>,
        quantity: u32,
        user_id: UserId,
    ) -> WaitlistEntry {
        let entry = WaitlistEntry {
            entry_id: EntryId::new(),
            event_id,
            ticket_type_id,
            quantity,
            status: WaitlistStatus::Waiting,
            user_id,
            created_at: Utc::now(),
            notified_at: None,
            expires_at: None,
        };
        self.entries
            .write()
            .await
            .insert(entry.entry_id, entry.clone());
        entry
    }

    /// Returns a clone of the entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntryNotFound`] if no such entry exists.
    pub async fn get(&self, entry_id: EntryId) -> Result<WaitlistEntry, CoreError> {
        let map = self.entries.read().await;
        map.get(&entry_id)
            .cloned()
            .ok_or(CoreError::EntryNotFound(*entry_id.as_uuid()))
    }

    /// Promotes the oldest `Waiting` entry whose quantity fits within
    /// `freed_quantity`. Sets `Notified` with `expires_at = now + window`
    /// and returns the promoted entry. Partial headroom is left for the
    /// next promotion pass, never reserved.
    pub async fn promote_next(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
        freed_quantity: u32,
        now: DateTime<Utc>,
    ) -> Option<WaitlistEntry> {
        let mut map = self.entries.write().await;
        let candidate = map
            .values_mut()
            .filter(|e| {
                e.event_id == event_id
                    && e.status == WaitlistStatus::Waiting
                    && e.ticket_type_id.as_deref() == ticket_type_id
                    && e.quantity <= freed_quantity
            })
            .min_by_key(|e| e.created_at)?;
        candidate.status = WaitlistStatus::Notified;
        candidate.notified_at = Some(now);
        candidate.expires_at = Some(now + self.expiry_window);
        Some(candidate.clone())
    }

    /// Expires every `Notified` entry whose deadline has passed.
    ///
    /// Idempotent: an already-`Expired` entry is never touched again.
    /// Returns the entries expired by this call so the caller can
    /// re-evaluate promotion for their event/ticket-type pairs.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Vec<WaitlistEntry> {
        let mut map = self.entries.write().await;
        let mut expired = Vec::new();
        for entry in map.values_mut() {
            if entry.status == WaitlistStatus::Notified
                && entry.expires_at.is_some_and(|at| at <= now)
            {
                entry.status = WaitlistStatus::Expired;
                expired.push(entry.clone());
            }
        }
        expired
    }

    /// 1-based queue position: one plus the number of `Waiting` entries
    /// created strictly earlier for the same event/ticket-type. `None`
    /// when the entry is not `Waiting` (it has no position to report).
    pub async fn position(&self, entry_id: EntryId) -> Option<u32> {
        let map = self.entries.read().await;
        let entry = map.get(&entry_id)?;
        if entry.status != WaitlistStatus::Waiting {
            return None;
        }
        let ahead = map
            .values()
            .filter(|e| {
                e.event_id == entry.event_id
                    && e.ticket_type_id == entry.ticket_type_id
                    && e.status == WaitlistStatus::Waiting
                    && e.created_at < entry.created_at
            })
            .count();
        Some(ahead as u32 + 1)
    }

    /// Converts the user's `Notified` entry for the event/type, if one is
    /// still inside its window. Called by the booking coordinator after a
    /// successful booking.
    pub async fn mark_converted(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Option<EntryId> {
        let mut map = self.entries.write().await;
        let entry = map.values_mut().find(|e| {
            e.event_id == event_id
                && e.user_id == user_id
                && e.ticket_type_id.as_deref() == ticket_type_id
                && e.status == WaitlistStatus::Notified
                && e.expires_at.is_none_or(|at| at > now)
        })?;
        entry.status = WaitlistStatus::Converted;
        Some(entry.entry_id)
    }

    /// Voluntary exit: `Waiting` or `Notified` becomes `Left`, without
    /// going through promotion.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EntryNotFound`] for an unknown entry.
    /// - [`CoreError::InvalidRequest`] when the entry is already terminal.
    pub async fn leave(&self, entry_id: EntryId) -> Result<WaitlistEntry, CoreError> {
        let mut map = self.entries.write().await;
        let entry = map
            .get_mut(&entry_id)
            .ok_or(CoreError::EntryNotFound(*entry_id.as_uuid()))?;
        match entry.status {
            WaitlistStatus::Waiting | WaitlistStatus::Notified => {
                entry.status = WaitlistStatus::Left;
                Ok(entry.clone())
            }
            _ => Err(CoreError::InvalidRequest(
                "waitlist entry is no longer active".to_string(),
            )),
        }
    }

    /// All entries owned by a user, oldest first, optionally filtered by
    /// status.
    pub async fn entries_for_user(
        &self,
        user_id: UserId,
        status: Option<WaitlistStatus>,
    ) -> Vec<WaitlistEntry> {
        let map = self.entries.read().await;
        let mut result: Vec<WaitlistEntry> = map
            .values()
            .filter(|e| e.user_id == user_id && status.is_none_or(|s| e.status == s))
            .cloned()
            .collect();
        result.sort_by_key(|e| e.created_at);
        result
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn store() -> WaitlistStore {
        WaitlistStore::new(Duration::hours(48))
    }

    /// Joins with a forced creation time so FIFO ordering is deterministic
    /// even when two joins land on the same clock tick.
    async fn join_at(
        store: &WaitlistStore,
        event_id: EventId,
        quantity: u32,
        offset_secs: i64,
    ) -> WaitlistEntry {
        let user = UserId::new();
        let entry = store.join(event_id, None, quantity, user).await;
        let mut map = store.entries.write().await;
        let Some(stored) = map.get_mut(&entry.entry_id) else {
            panic!("entry vanished");
        };
        stored.created_at = Utc::now() + Duration::seconds(offset_secs);
        stored.clone()
    }

    #[tokio::test]
    async fn promotion_is_fifo() {
        let store = store();
        let event_id = EventId::new();
        let a = join_at(&store, event_id, 1, 0).await;
        let b = join_at(&store, event_id, 1, 1).await;
        let _c = join_at(&store, event_id, 1, 2).await;

        let now = Utc::now();
        let first = store.promote_next(event_id, None, 1, now).await;
        assert_eq!(first.map(|e| e.entry_id), Some(a.entry_id));

        let second = store.promote_next(event_id, None, 1, now).await;
        assert_eq!(second.map(|e| e.entry_id), Some(b.entry_id));
    }

    #[tokio::test]
    async fn promotion_skips_entries_that_do_not_fit() {
        let store = store();
        let event_id = EventId::new();
        let _big = join_at(&store, event_id, 4, 0).await;
        let small = join_at(&store, event_id, 2, 1).await;

        // Only 2 units freed: the older 4-unit request doesn't fit, the
        // younger 2-unit one does.
        let promoted = store.promote_next(event_id, None, 2, Utc::now()).await;
        assert_eq!(promoted.map(|e| e.entry_id), Some(small.entry_id));
    }

    #[tokio::test]
    async fn promotion_sets_expiry_window() {
        let store = store();
        let event_id = EventId::new();
        let _a = join_at(&store, event_id, 1, 0).await;

        let now = Utc::now();
        let Some(promoted) = store.promote_next(event_id, None, 1, now).await else {
            panic!("expected promotion");
        };
        assert_eq!(promoted.status, WaitlistStatus::Notified);
        assert_eq!(promoted.notified_at, Some(now));
        assert_eq!(promoted.expires_at, Some(now + Duration::hours(48)));
    }

    #[tokio::test]
    async fn sweep_expires_lapsed_entries_only() {
        let store = store();
        let event_id = EventId::new();
        let _a = join_at(&store, event_id, 1, 0).await;
        let _b = join_at(&store, event_id, 1, 1).await;

        let past = Utc::now() - Duration::hours(49);
        let Some(lapsed) = store.promote_next(event_id, None, 1, past).await else {
            panic!("expected promotion");
        };
        let Some(fresh) = store.promote_next(event_id, None, 1, Utc::now()).await else {
            panic!("expected promotion");
        };

        let now = Utc::now();
        let expired = store.sweep_expired(now).await;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired.first().map(|e| e.entry_id), Some(lapsed.entry_id));

        // Idempotent: a second sweep finds nothing new.
        assert!(store.sweep_expired(now).await.is_empty());

        let still_notified = store.get(fresh.entry_id).await;
        assert_eq!(
            still_notified.map(|e| e.status).ok(),
            Some(WaitlistStatus::Notified)
        );
    }

    #[tokio::test]
    async fn position_counts_earlier_waiting_entries() {
        let store = store();
        let event_id = EventId::new();
        let a = join_at(&store, event_id, 1, 0).await;
        let b = join_at(&store, event_id, 1, 1).await;
        let c = join_at(&store, event_id, 1, 2).await;

        assert_eq!(store.position(a.entry_id).await, Some(1));
        assert_eq!(store.position(b.entry_id).await, Some(2));
        assert_eq!(store.position(c.entry_id).await, Some(3));

        // Promoting the head shifts everyone up on the next read.
        let _ = store.promote_next(event_id, None, 1, Utc::now()).await;
        assert_eq!(store.position(a.entry_id).await, None);
        assert_eq!(store.position(b.entry_id).await, Some(1));
        assert_eq!(store.position(c.entry_id).await, Some(2));
    }

    #[tokio::test]
    async fn converted_inside_window() {
        let store = store();
        let event_id = EventId::new();
        let user = UserId::new();
        let entry = store.join(event_id, None, 1, user).await;

        let now = Utc::now();
        let _ = store.promote_next(event_id, None, 1, now).await;
        let converted = store.mark_converted(event_id, None, user, now).await;
        assert_eq!(converted, Some(entry.entry_id));

        let after = store.get(entry.entry_id).await;
        assert_eq!(
            after.map(|e| e.status).ok(),
            Some(WaitlistStatus::Converted)
        );
    }

    #[tokio::test]
    async fn leave_rejects_terminal_entries() {
        let store = store();
        let event_id = EventId::new();
        let user = UserId::new();
        let entry = store.join(event_id, None, 1, user).await;

        assert!(store.leave(entry.entry_id).await.is_ok());
        assert!(matches!(
            store.leave(entry.entry_id).await,
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn entries_for_user_filters_by_status() {
        let store = store();
        let event_id = EventId::new();
        let user = UserId::new();
        let _w = store.join(event_id, None, 1, user).await;
        let left = store.join(EventId::new(), None, 1, user).await;
        let _ = store.leave(left.entry_id).await;

        let waiting = store
            .entries_for_user(user, Some(WaitlistStatus::Waiting))
            .await;
        assert_eq!(waiting.len(), 1);
        let all = store.entries_for_user(user, None).await;
        assert_eq!(all.len(), 2);
    }
}
