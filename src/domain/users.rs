//! User directory: the collaborator surface cohort queries run against.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::UserId;

/// Operational role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform administrator.
    Admin,
    /// Operational staff (check-in, support).
    Staff,
    /// Plain end-user.
    User,
}

/// A user account as seen by the notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    /// Unique user identifier.
    pub user_id: UserId,
    /// Contact email address.
    pub email: String,
    /// Display name, used as the recipient name in emails.
    pub name: String,
    /// Operational role.
    pub role: UserRole,
    /// Deactivated accounts are excluded from every cohort.
    pub active: bool,
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, UserAccount>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user account.
    pub async fn upsert(&self, account: UserAccount) {
        let mut map = self.users.write().await;
        map.insert(account.user_id, account);
    }

    /// All active accounts.
    pub async fn active_users(&self) -> Vec<UserAccount> {
        let map = self.users.read().await;
        map.values().filter(|u| u.active).cloned().collect()
    }
}
