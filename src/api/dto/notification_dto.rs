//! Notification DTOs for the admin broadcast surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Notification, NotificationStatus, RecipientType};

/// Request body for `POST /notifications/broadcast`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BroadcastRequestDto {
    /// Email subject line.
    pub subject: String,
    /// Headline inside the message body.
    pub title: String,
    /// HTML body.
    pub html: String,
    /// Free-form message category (e.g. `"announcement"`).
    pub message_type: String,
    /// Target cohort.
    pub recipient_type: RecipientType,
}

/// A notification record as returned to the admin UI.
#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationDto {
    /// Notification identifier.
    pub notification_id: Uuid,
    /// Subject line.
    pub subject: String,
    /// Headline.
    pub title: String,
    /// Message category.
    pub message_type: String,
    /// Cohort targeted.
    pub recipient_type: RecipientType,
    /// Delivery outcome.
    pub status: NotificationStatus,
    /// Recipients delivered to.
    pub sent_count: u32,
    /// Recipients that failed.
    pub failed_count: u32,
    /// Failure summary, when any delivery failed.
    pub error_summary: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            notification_id: *n.notification_id.as_uuid(),
            subject: n.subject,
            title: n.title,
            message_type: n.message_type,
            recipient_type: n.recipient_type,
            status: n.status,
            sent_count: n.sent_count,
            failed_count: n.failed_count,
            error_summary: n.error_summary,
            created_at: n.created_at,
        }
    }
}

/// Response body for `POST /notifications/broadcast`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BroadcastResponse {
    /// Recipients delivered to.
    pub sent: u32,
    /// Recipients that failed (reported as counts, not an error).
    pub failed: u32,
    /// The stored notification record.
    pub notification: NotificationDto,
}
