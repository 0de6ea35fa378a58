//! Waitlist DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::WaitlistStatus;
use crate::error::CoreError;
use crate::service::PositionedEntry;

/// Request body for `POST /waitlist/join`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinWaitlistRequest {
    /// Sold-out event to queue for.
    pub event_id: Uuid,
    /// Ticket type, when the event sells through types.
    #[serde(default)]
    pub ticket_type_id: Option<String>,
    /// Units wanted.
    pub quantity: u32,
}

/// Query parameters for `GET /waitlist/my-waitlist`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct WaitlistQuery {
    /// Optional status filter (`waiting`, `notified`, `expired`,
    /// `converted`, `left`).
    #[serde(default)]
    pub status: Option<String>,
}

impl WaitlistQuery {
    /// Parses the status filter.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] for an unknown status string.
    pub fn parsed_status(&self) -> Result<Option<WaitlistStatus>, CoreError> {
        match self.status.as_deref() {
            None | Some("") => Ok(None),
            Some("waiting") => Ok(Some(WaitlistStatus::Waiting)),
            Some("notified") => Ok(Some(WaitlistStatus::Notified)),
            Some("expired") => Ok(Some(WaitlistStatus::Expired)),
            Some("converted") => Ok(Some(WaitlistStatus::Converted)),
            Some("left") => Ok(Some(WaitlistStatus::Left)),
            Some(other) => Err(CoreError::InvalidRequest(format!(
                "unknown waitlist status: {other}"
            ))),
        }
    }
}

/// A waitlist entry with its derived queue position.
#[derive(Debug, Serialize, ToSchema)]
pub struct WaitlistEntryResponse {
    /// Entry identifier.
    pub entry_id: Uuid,
    /// Event queued for.
    pub event_id: Uuid,
    /// Ticket type, if any.
    pub ticket_type_id: Option<String>,
    /// Units wanted.
    pub quantity: u32,
    /// Lifecycle state.
    pub status: WaitlistStatus,
    /// 1-based queue rank, present only while `waiting`.
    pub current_position: Option<u32>,
    /// Promotion timestamp, if promoted.
    pub notified_at: Option<DateTime<Utc>>,
    /// Conversion deadline, if promoted.
    pub expires_at: Option<DateTime<Utc>>,
    /// Join timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<PositionedEntry> for WaitlistEntryResponse {
    fn from(positioned: PositionedEntry) -> Self {
        let entry = positioned.entry;
        Self {
            entry_id: *entry.entry_id.as_uuid(),
            event_id: *entry.event_id.as_uuid(),
            ticket_type_id: entry.ticket_type_id,
            quantity: entry.quantity,
            status: entry.status,
            current_position: positioned.current_position,
            notified_at: entry.notified_at,
            expires_at: entry.expires_at,
            created_at: entry.created_at,
        }
    }
}
