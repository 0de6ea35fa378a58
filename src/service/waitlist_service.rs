//! Waitlist promotion engine.
//!
//! Owns the join/leave/list surface and the two promotion triggers:
//! capacity being freed (called by the booking coordinator) and the
//! idempotent expiry sweep (called by the background tick and lazily on
//! reads).

use std::sync::Arc;

use chrono::Utc;

use crate::domain::ledger::UNLIMITED;
use crate::domain::{
    CapacityLedger, EntryId, EventId, UserDirectory, UserId, WaitlistEntry, WaitlistStatus,
    WaitlistStore,
};
use crate::error::CoreError;
use crate::mail::MailTransport;

/// A waitlist entry paired with its derived queue position.
#[derive(Debug, Clone)]
pub struct PositionedEntry {
    /// The entry itself.
    pub entry: WaitlistEntry,
    /// 1-based rank among `Waiting` entries, when still waiting.
    pub current_position: Option<u32>,
}

/// Orchestrates waitlist state transitions and promotion notifications.
#[derive(Debug, Clone)]
pub struct WaitlistService {
    ledger: Arc<CapacityLedger>,
    waitlist: Arc<WaitlistStore>,
    users: Arc<UserDirectory>,
    mail: Arc<dyn MailTransport>,
}

impl WaitlistService {
    /// Creates a new `WaitlistService`.
    #[must_use]
    pub fn new(
        ledger: Arc<CapacityLedger>,
        waitlist: Arc<WaitlistStore>,
        users: Arc<UserDirectory>,
        mail: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            ledger,
            waitlist,
            users,
            mail,
        }
    }

    /// Joins the waitlist for a sold-out event.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidRequest`] for a zero quantity or when the
    ///   event still has available units (the caller should book instead).
    /// - Ledger lookup errors for unknown events or ticket types.
    pub async fn join(
        &self,
        event_id: EventId,
        ticket_type_id: Option<String>,
        quantity: u32,
        user_id: UserId,
    ) -> Result<WaitlistEntry, CoreError> {
        if quantity == 0 {
            return Err(CoreError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        let available = self
            .ledger
            .available_units(event_id, ticket_type_id.as_deref())
            .await?;
        if available == UNLIMITED || available > 0 {
            return Err(CoreError::InvalidRequest(
                "event is not sold out; book directly instead".to_string(),
            ));
        }
        let entry = self
            .waitlist
            .join(event_id, ticket_type_id, quantity, user_id)
            .await;
        tracing::info!(%event_id, entry_id = %entry.entry_id, quantity, "joined waitlist");
        Ok(entry)
    }

    /// The user's entries with derived positions, optionally filtered by
    /// status. Runs a lazy sweep first so stale `Notified` entries are
    /// reported as `Expired` even between background ticks.
    pub async fn my_waitlist(
        &self,
        user_id: UserId,
        status: Option<WaitlistStatus>,
    ) -> Vec<PositionedEntry> {
        self.sweep_expired().await;
        let entries = self.waitlist.entries_for_user(user_id, status).await;
        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            let current_position = self.waitlist.position(entry.entry_id).await;
            result.push(PositionedEntry {
                entry,
                current_position,
            });
        }
        result
    }

    /// Derived 1-based queue position for a `Waiting` entry.
    pub async fn position(&self, entry_id: EntryId) -> Option<u32> {
        self.waitlist.position(entry_id).await
    }

    /// Voluntary leave. Only the owner may remove an entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntryNotFound`] for an unknown entry or one
    /// owned by another user, [`CoreError::InvalidRequest`] when the
    /// entry is already terminal.
    pub async fn leave(&self, entry_id: EntryId, user_id: UserId) -> Result<(), CoreError> {
        let entry = self.waitlist.get(entry_id).await?;
        if entry.user_id != user_id {
            // Not distinguishable from a missing entry to the caller.
            return Err(CoreError::EntryNotFound(*entry_id.as_uuid()));
        }
        let left = self.waitlist.leave(entry_id).await?;
        tracing::info!(entry_id = %left.entry_id, event_id = %left.event_id, "left waitlist");
        Ok(())
    }

    /// Promotion trigger: capacity was freed for an event/ticket-type.
    ///
    /// Selects the oldest `Waiting` entry that fits within the freed
    /// quantity, transitions it to `Notified` with the expiry window, and
    /// emits the notification email. Partial headroom is left for the
    /// next trigger.
    pub async fn on_capacity_freed(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
        freed_quantity: u32,
    ) {
        let now = Utc::now();
        let Some(promoted) = self
            .waitlist
            .promote_next(event_id, ticket_type_id, freed_quantity, now)
            .await
        else {
            return;
        };
        tracing::info!(
            entry_id = %promoted.entry_id,
            %event_id,
            quantity = promoted.quantity,
            "waitlist entry promoted"
        );
        self.send_promotion_email(&promoted).await;
    }

    /// Idempotent expiry sweep.
    ///
    /// Expires lapsed `Notified` entries, then re-evaluates promotion for
    /// each affected event/ticket-type with whatever units are currently
    /// available, so the next queued entry gets its chance. Returns the
    /// number of entries expired.
    pub async fn sweep_expired(&self) -> usize {
        let expired = self.waitlist.sweep_expired(Utc::now()).await;
        for entry in &expired {
            tracing::info!(entry_id = %entry.entry_id, event_id = %entry.event_id, "waitlist entry expired");
            let available = self
                .ledger
                .available_units(entry.event_id, entry.ticket_type_id.as_deref())
                .await
                .unwrap_or(0);
            if available > 0 && available != UNLIMITED {
                self.on_capacity_freed(entry.event_id, entry.ticket_type_id.as_deref(), available)
                    .await;
            }
        }
        expired.len()
    }

    /// Records a booking by a `Notified` user as a conversion.
    pub async fn note_conversion(
        &self,
        event_id: EventId,
        ticket_type_id: Option<&str>,
        user_id: UserId,
    ) {
        if let Some(entry_id) = self
            .waitlist
            .mark_converted(event_id, ticket_type_id, user_id, Utc::now())
            .await
        {
            tracing::info!(%entry_id, %event_id, "waitlist entry converted");
        }
    }

    async fn send_promotion_email(&self, entry: &WaitlistEntry) {
        let account = self
            .users
            .active_users()
            .await
            .into_iter()
            .find(|u| u.user_id == entry.user_id);
        let Some(account) = account else {
            tracing::warn!(entry_id = %entry.entry_id, "promoted user has no active account; skipping email");
            return;
        };
        let deadline = entry
            .expires_at
            .map_or_else(String::new, |at| at.to_rfc3339());
        let html = format!(
            "<p>Tickets are now available for your waitlisted event. \
             Complete your booking before {deadline}.</p>"
        );
        let delivered = self
            .mail
            .send_notification_email(
                &account.email,
                "You're off the waitlist!",
                "Tickets available",
                &html,
                "waitlist_promotion",
                &account.name,
            )
            .await;
        if !delivered {
            tracing::warn!(entry_id = %entry.entry_id, to = %account.email, "promotion email failed");
        }
    }
}
