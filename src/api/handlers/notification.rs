//! Admin notification handlers: broadcast and recent history.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{BroadcastRequestDto, BroadcastResponse, NotificationDto};
use crate::app_state::AppState;
use crate::error::{CoreError, ErrorResponse};
use crate::service::BroadcastRequest;

use super::admin_identity;

/// `POST /notifications/broadcast` — Send a broadcast to a cohort.
///
/// # Errors
///
/// Returns [`CoreError::DuplicateRecent`] (409) when an identical
/// broadcast was created within the dedup window.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/broadcast",
    tag = "Notifications",
    summary = "Broadcast a notification",
    description = "Deduplicates by content hash, resolves the recipient cohort, and fans out delivery with bounded concurrency. Partial delivery failures are reported as counts in a successful response.",
    request_body = BroadcastRequestDto,
    responses(
        (status = 200, description = "Dispatch finished", body = BroadcastResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Duplicate broadcast within the window", body = ErrorResponse),
    )
)]
pub async fn broadcast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<BroadcastRequestDto>,
) -> Result<impl IntoResponse, CoreError> {
    let outcome = state
        .notify_service
        .broadcast(BroadcastRequest {
            subject: req.subject,
            title: req.title,
            html: req.html,
            message_type: req.message_type,
            recipient_type: req.recipient_type,
            sender: admin_identity(&headers),
        })
        .await?;
    Ok((
        StatusCode::OK,
        Json(BroadcastResponse {
            sent: outcome.sent,
            failed: outcome.failed,
            notification: NotificationDto::from(outcome.notification),
        }),
    ))
}

/// `GET /notifications/recent` — Recent broadcast records.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/recent",
    tag = "Notifications",
    summary = "Recent broadcasts",
    description = "Returns the most recent notification records, newest first.",
    responses(
        (status = 200, description = "Notification records", body = Vec<NotificationDto>),
    )
)]
pub async fn recent(State(state): State<AppState>) -> impl IntoResponse {
    let records: Vec<NotificationDto> = state
        .notify_service
        .recent(50)
        .await
        .into_iter()
        .map(NotificationDto::from)
        .collect();
    Json(records)
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications/broadcast", post(broadcast))
        .route("/notifications/recent", get(recent))
}
