//! Event DTOs for the admin event surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::TicketType;

/// One ticket type in an event creation request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketTypeDto {
    /// Stable identifier unique within the event (e.g. `"general"`).
    pub type_id: String,
    /// Display name.
    pub name: String,
    /// Price per unit in cents.
    pub price_cents: u64,
    /// Units sellable for this type.
    pub quantity: u32,
}

impl From<TicketTypeDto> for TicketType {
    fn from(dto: TicketTypeDto) -> Self {
        Self::new(dto.type_id, dto.name, dto.price_cents, dto.quantity)
    }
}

/// Request body for `POST /events`.
///
/// Provide either `capacity` (flat model, or omit both for unlimited
/// ticketing) or `ticket_types` — not both.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Display name.
    pub name: String,
    /// Flat capacity. `None` with no types means unlimited.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Per-type inventory.
    #[serde(default)]
    pub ticket_types: Option<Vec<TicketTypeDto>>,
}

/// Response body for `POST /events` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateEventResponse {
    /// Event identifier.
    pub event_id: Uuid,
    /// Display name echoed from the request.
    pub name: String,
    /// Effective capacity (flat or sum of type quantities).
    pub capacity: Option<u32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query parameters for `GET /events/:id/availability`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Ticket type to read, when the event sells through types.
    #[serde(default)]
    pub ticket_type_id: Option<String>,
}

/// Response body for `GET /events/:id/availability`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Units currently available. `None` for unlimited ticketing.
    pub available: Option<u32>,
}
