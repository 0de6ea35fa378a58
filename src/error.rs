//! Core error types with HTTP status code mapping.
//!
//! [`CoreError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient capacity: requested 4, available 2",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category           | HTTP Status                  |
/// |-----------|--------------------|------------------------------|
/// | 1000–1999 | Validation         | 400 Bad Request              |
/// | 2000–2999 | State/Not Found    | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server             | 500 Internal Server Error    |
/// | 4000–4999 | Inventory-Specific | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Booking with the given ID was not found.
    #[error("booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// Waitlist entry with the given ID was not found.
    #[error("waitlist entry not found: {0}")]
    EntryNotFound(uuid::Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested quantity exceeds the units currently available.
    ///
    /// Terminal and user-correctable. Never retried by the core.
    #[error("insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity {
        /// Units the caller asked for.
        requested: u32,
        /// Units actually available at decision time.
        available: u32,
    },

    /// A requested seat is already held by another non-cancelled booking.
    ///
    /// Carries the first offending seat number so the UI can refresh it.
    #[error("seat {0} is already booked")]
    SeatConflict(u32),

    /// An identical broadcast was submitted within the dedup window.
    #[error("an identical notification was sent recently")]
    DuplicateRecent,

    /// Persistence layer failure.
    ///
    /// When raised after a capacity reservation was taken, the coordinator
    /// has already issued the compensating release.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::BookingNotFound(_) => 2002,
            Self::EntryNotFound(_) => 2003,
            Self::DuplicateRecent => 2409,
            Self::InsufficientCapacity { .. } => 4001,
            Self::SeatConflict(_) => 4002,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::BookingNotFound(_) | Self::EntryNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::DuplicateRecent => StatusCode::CONFLICT,
            Self::InsufficientCapacity { .. } | Self::SeatConflict(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
