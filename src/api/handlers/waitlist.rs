//! Waitlist handlers: join, list, and voluntary leave.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{JoinWaitlistRequest, WaitlistEntryResponse, WaitlistQuery};
use crate::app_state::AppState;
use crate::domain::{EntryId, EventId};
use crate::error::{CoreError, ErrorResponse};
use crate::service::PositionedEntry;

use super::caller_id;

/// `POST /waitlist/join` — Join the waitlist for a sold-out event.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] when the event still has
/// available units.
#[utoipa::path(
    post,
    path = "/api/v1/waitlist/join",
    tag = "Waitlist",
    summary = "Join a waitlist",
    description = "Appends a waiting entry for a sold-out event/ticket-type. Position is derived FIFO by join time.",
    request_body = JoinWaitlistRequest,
    responses(
        (status = 201, description = "Entry created", body = WaitlistEntryResponse),
        (status = 400, description = "Event not sold out or invalid request", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn join_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<JoinWaitlistRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = caller_id(&headers)?;
    let entry = state
        .waitlist_service
        .join(
            EventId::from_uuid(req.event_id),
            req.ticket_type_id,
            req.quantity,
            user_id,
        )
        .await?;
    let current_position = state.waitlist_service.position(entry.entry_id).await;
    Ok((
        StatusCode::CREATED,
        Json(WaitlistEntryResponse::from(PositionedEntry {
            entry,
            current_position,
        })),
    ))
}

/// `GET /waitlist/my-waitlist` — The caller's entries with positions.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] for an unknown status filter.
#[utoipa::path(
    get,
    path = "/api/v1/waitlist/my-waitlist",
    tag = "Waitlist",
    summary = "List the caller's waitlist entries",
    description = "Runs a lazy expiry sweep, then returns entries with their derived queue positions.",
    params(WaitlistQuery),
    responses(
        (status = 200, description = "Waitlist entries", body = Vec<WaitlistEntryResponse>),
        (status = 400, description = "Unknown status filter", body = ErrorResponse),
    )
)]
pub async fn my_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WaitlistQuery>,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = caller_id(&headers)?;
    let status = query.parsed_status()?;
    let entries: Vec<WaitlistEntryResponse> = state
        .waitlist_service
        .my_waitlist(user_id, status)
        .await
        .into_iter()
        .map(WaitlistEntryResponse::from)
        .collect();
    Ok(Json(entries))
}

/// `DELETE /waitlist/:id` — Leave the waitlist voluntarily.
///
/// # Errors
///
/// Returns [`CoreError::EntryNotFound`] for an unknown entry or one
/// owned by another caller.
#[utoipa::path(
    delete,
    path = "/api/v1/waitlist/{id}",
    tag = "Waitlist",
    summary = "Leave a waitlist",
    description = "Marks the caller's entry as left without going through promotion.",
    params(
        ("id" = uuid::Uuid, Path, description = "Waitlist entry UUID"),
    ),
    responses(
        (status = 204, description = "Entry left"),
        (status = 404, description = "Entry not found", body = ErrorResponse),
    )
)]
pub async fn leave_waitlist(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let user_id = caller_id(&headers)?;
    state
        .waitlist_service
        .leave(EntryId::from_uuid(id), user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Waitlist routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/waitlist/join", post(join_waitlist))
        .route("/waitlist/my-waitlist", get(my_waitlist))
        .route("/waitlist/{id}", delete(leave_waitlist))
}
