//! PostgreSQL implementation of the record archive.

use async_trait::async_trait;
use sqlx::PgPool;

use super::RecordArchive;
use crate::domain::{Booking, Notification};
use crate::error::CoreError;

/// PostgreSQL-backed archive using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresArchive {
    pool: PgPool,
}

impl PostgresArchive {
    /// Creates a new archive with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordArchive for PostgresArchive {
    async fn archive_booking(&self, booking: &Booking) -> Result<(), CoreError> {
        let seats_json = serde_json::to_value(&booking.seats)
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        let ticket_ids_json = serde_json::to_value(&booking.ticket_ids)
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO bookings \
             (booking_id, event_id, ticket_type_id, quantity, seats, status, ticket_ids, user_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, 'confirmed', $6, $7, $8)",
        )
        .bind(booking.booking_id.as_uuid())
        .bind(booking.event_id.as_uuid())
        .bind(booking.ticket_type_id.as_deref())
        .bind(i64::from(booking.quantity))
        .bind(seats_json)
        .bind(ticket_ids_json)
        .bind(booking.user_id.as_uuid())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    async fn mark_booking_cancelled(&self, booking: &Booking) -> Result<(), CoreError> {
        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE booking_id = $1")
            .bind(booking.booking_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    async fn archive_notification(&self, notification: &Notification) -> Result<(), CoreError> {
        let status = match notification.status {
            crate::domain::NotificationStatus::Pending => "pending",
            crate::domain::NotificationStatus::Sent => "sent",
            crate::domain::NotificationStatus::Failed => "failed",
        };
        sqlx::query(
            "INSERT INTO notifications \
             (notification_id, subject, title, html, message_type, recipient_type, dedup_key, \
              status, sent_count, failed_count, error_summary, sender, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(notification.notification_id.as_uuid())
        .bind(&notification.subject)
        .bind(&notification.title)
        .bind(&notification.html)
        .bind(&notification.message_type)
        .bind(notification.recipient_type.as_str())
        .bind(&notification.dedup_key)
        .bind(status)
        .bind(i64::from(notification.sent_count))
        .bind(i64::from(notification.failed_count))
        .bind(notification.error_summary.as_deref())
        .bind(notification.sender.as_deref())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(())
    }
}
