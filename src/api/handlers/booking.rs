//! Booking handlers: create, cancel, and seat reads.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    BookedSeatsResponse, BookingResponse, CreateBookingRequest, SeatLayoutResponse,
};
use crate::app_state::AppState;
use crate::domain::{BookingId, EventId};
use crate::error::{CoreError, ErrorResponse};
use crate::service::CreateBooking;

use super::caller_id;

/// `POST /bookings` — Create a confirmed booking.
///
/// # Errors
///
/// Returns [`CoreError`] for validation failures, sold-out inventory
/// (422), seat conflicts (422), or archive failures (500, reservation
/// already released).
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    summary = "Create a booking",
    description = "Reserves capacity atomically, validates any requested seats server-side, and mints one ticket identifier per unit. Capacity and seat errors are terminal; resubmit with different parameters.",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking confirmed", body = BookingResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 422, description = "Sold out or seat conflict", body = ErrorResponse),
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = caller_id(&headers)?;
    let booking = state
        .booking_service
        .create_booking(CreateBooking {
            event_id: EventId::from_uuid(req.event_id),
            ticket_type_id: req.ticket_type_id,
            quantity: req.quantity,
            seats: req.seats,
            user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

/// `DELETE /bookings/:id` — Cancel a booking.
///
/// # Errors
///
/// Returns [`CoreError::BookingNotFound`] for an unknown booking.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    summary = "Cancel a booking",
    description = "Releases the booking's reserved units (idempotent) and triggers waitlist promotion for the freed inventory.",
    params(
        ("id" = uuid::Uuid, Path, description = "Booking UUID"),
    ),
    responses(
        (status = 204, description = "Booking cancelled"),
        (status = 404, description = "Booking not found", body = ErrorResponse),
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    state
        .booking_service
        .cancel_booking(BookingId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /bookings/my-bookings` — The caller's bookings, newest first.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] when the caller header is
/// missing or malformed.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/my-bookings",
    tag = "Bookings",
    summary = "List the caller's bookings",
    responses(
        (status = 200, description = "Bookings owned by the caller", body = Vec<BookingResponse>),
        (status = 400, description = "Missing caller identity", body = ErrorResponse),
    )
)]
pub async fn my_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = caller_id(&headers)?;
    let bookings: Vec<BookingResponse> = state
        .booking_service
        .bookings()
        .bookings_for_user(user_id)
        .await
        .into_iter()
        .map(BookingResponse::from)
        .collect();
    Ok(Json(bookings))
}

/// `GET /bookings/event/:id/seats` — Booked seats for an event.
///
/// # Errors
///
/// Returns [`CoreError::EventNotFound`] for an unknown event.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/event/{id}/seats",
    tag = "Bookings",
    summary = "Booked seats for an event",
    description = "Union of seat numbers across all non-cancelled bookings, recomputed on every read.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Booked seat numbers", body = BookedSeatsResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn booked_seats(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let seats = state
        .booking_service
        .booked_seats(EventId::from_uuid(id))
        .await?;
    Ok(Json(BookedSeatsResponse {
        booked_seats: seats,
    }))
}

/// `GET /bookings/event/:id/layout` — Deterministic seat layout.
///
/// # Errors
///
/// Returns [`CoreError::EventNotFound`] or [`CoreError::InvalidRequest`]
/// for unlimited events.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/event/{id}/layout",
    tag = "Bookings",
    summary = "Seat layout for an event",
    description = "Row-major grid derived from capacity alone, ten seats per row, last row possibly partial.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Seat layout rows", body = SeatLayoutResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn seat_layout(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let rows = state
        .booking_service
        .seat_layout(EventId::from_uuid(id))
        .await?;
    Ok(Json(SeatLayoutResponse { rows }))
}

/// Booking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/my-bookings", get(my_bookings))
        .route("/bookings/{id}", delete(cancel_booking))
        .route("/bookings/event/{id}/seats", get(booked_seats))
        .route("/bookings/event/{id}/layout", get(seat_layout))
}
