//! Event handlers: registration and availability reads.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AvailabilityQuery, AvailabilityResponse, CreateEventRequest, CreateEventResponse,
};
use crate::app_state::AppState;
use crate::domain::ledger::UNLIMITED;
use crate::domain::{EventId, EventRecord};
use crate::error::{CoreError, ErrorResponse};

/// `POST /events` — Register an event with the capacity ledger.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] when both a flat capacity and
/// ticket types are provided.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Register an event",
    description = "Creates the event's inventory: a flat capacity, per-type quantities, or unlimited ticketing when neither is given.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event registered", body = CreateEventResponse),
        (status = 400, description = "Invalid capacity model", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let record = match (req.capacity, req.ticket_types) {
        (Some(_), Some(types)) if !types.is_empty() => {
            return Err(CoreError::InvalidRequest(
                "provide either capacity or ticket_types, not both".to_string(),
            ));
        }
        (_, Some(types)) if !types.is_empty() => {
            EventRecord::with_types(req.name, types.into_iter().map(Into::into).collect())
        }
        (capacity, _) => EventRecord::flat(req.name, capacity),
    };

    let response = CreateEventResponse {
        event_id: *record.event_id.as_uuid(),
        name: record.name.clone(),
        capacity: record.capacity,
        created_at: record.created_at,
    };
    state.booking_service.ledger().register_event(record).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /events/:id/availability` — Units currently available.
///
/// # Errors
///
/// Returns [`CoreError::EventNotFound`] or [`CoreError::InvalidRequest`]
/// when the type selector does not match the event's capacity model.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/availability",
    tag = "Events",
    summary = "Read availability",
    description = "Live available units for an event or one of its ticket types. Null means unlimited.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        AvailabilityQuery,
    ),
    responses(
        (status = 200, description = "Available units", body = AvailabilityResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn availability(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, CoreError> {
    let available = state
        .booking_service
        .ledger()
        .available_units(EventId::from_uuid(id), query.ticket_type_id.as_deref())
        .await?;
    Ok(Json(AvailabilityResponse {
        available: (available != UNLIMITED).then_some(available),
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}/availability", get(availability))
}
