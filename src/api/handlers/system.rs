//! System endpoints: health check and recipient-type catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Supported recipient cohort info.
#[derive(Debug, Serialize, ToSchema)]
struct RecipientTypeInfo {
    recipient_type: &'static str,
    description: &'static str,
    role_filtered: bool,
}

/// `GET /config/recipient-types` — List supported broadcast cohorts.
#[utoipa::path(
    get,
    path = "/config/recipient-types",
    tag = "System",
    summary = "List supported recipient types",
    description = "Returns metadata for every recipient cohort a broadcast can target.",
    responses(
        (status = 200, description = "Recipient type catalog", body = Vec<RecipientTypeInfo>),
    )
)]
pub async fn recipient_types_handler() -> impl IntoResponse {
    let types = vec![
        RecipientTypeInfo {
            recipient_type: "all",
            description: "Every active account regardless of role",
            role_filtered: false,
        },
        RecipientTypeInfo {
            recipient_type: "registered",
            description: "Active accounts with the user role",
            role_filtered: true,
        },
        RecipientTypeInfo {
            recipient_type: "participants",
            description: "Active accounts holding at least one non-cancelled booking",
            role_filtered: false,
        },
        RecipientTypeInfo {
            recipient_type: "staff",
            description: "Active accounts with the staff or admin role",
            role_filtered: true,
        },
    ];
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/recipient-types", get(recipient_types_handler))
}
