//! User directory handler.
//!
//! Accounts normally arrive from the platform's auth service; this
//! endpoint is the minimal registration surface the notification
//! cohorts run against.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RegisterUserRequest, RegisterUserResponse};
use crate::app_state::AppState;
use crate::domain::{UserAccount, UserId};
use crate::error::{CoreError, ErrorResponse};

/// `POST /users` — Register a user account.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] for an empty email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a user",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterUserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, CoreError> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(CoreError::InvalidRequest(
            "a valid email address is required".to_string(),
        ));
    }
    let account = UserAccount {
        user_id: UserId::new(),
        email: req.email,
        name: req.name,
        role: req.role,
        active: true,
    };
    let response = RegisterUserResponse {
        user_id: *account.user_id.as_uuid(),
        email: account.email.clone(),
    };
    state.users.upsert(account).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", post(register_user))
}
