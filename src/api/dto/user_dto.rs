//! User directory DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::UserRole;

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    /// Contact email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Operational role. Defaults to a plain end-user.
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Response body for `POST /users` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterUserResponse {
    /// Assigned user identifier.
    pub user_id: Uuid,
    /// Email echoed from the request.
    pub email: String,
}
