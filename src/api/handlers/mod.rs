//! REST endpoint handlers organized by resource.

pub mod booking;
pub mod event;
pub mod notification;
pub mod system;
pub mod users;
pub mod waitlist;

use axum::Router;
use axum::http::HeaderMap;

use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::CoreError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(booking::routes())
        .merge(event::routes())
        .merge(notification::routes())
        .merge(users::routes())
        .merge(waitlist::routes())
}

/// Extracts the authenticated caller from the `x-user-id` header.
///
/// Authentication itself is an upstream collaborator; the core only
/// consumes the identity it attaches.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] when the header is missing or
/// not a UUID.
pub fn caller_id(headers: &HeaderMap) -> Result<UserId, CoreError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::InvalidRequest("missing x-user-id header".to_string()))?;
    let uuid = raw
        .parse::<uuid::Uuid>()
        .map_err(|_| CoreError::InvalidRequest("x-user-id is not a valid UUID".to_string()))?;
    Ok(UserId::from_uuid(uuid))
}

/// Extracts the admin identity attached to broadcast operations, if any.
#[must_use]
pub fn admin_identity(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-admin-email")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
