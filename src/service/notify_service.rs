//! Notification dispatcher: dedup, cohort resolution, bounded fan-out.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use futures_util::stream::{self, StreamExt};

use crate::domain::notification::dedup_key;
use crate::domain::{
    BookingStore, Notification, NotificationId, NotificationLog, NotificationStatus,
    RecipientType, UserAccount, UserDirectory, UserRole,
};
use crate::error::CoreError;
use crate::mail::MailTransport;
use crate::persistence::RecordArchive;

/// An admin broadcast request.
#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    /// Email subject line.
    pub subject: String,
    /// Headline inside the message body.
    pub title: String,
    /// HTML body.
    pub html: String,
    /// Free-form message category.
    pub message_type: String,
    /// Target cohort.
    pub recipient_type: RecipientType,
    /// Authenticated admin identity, attached by the API layer.
    pub sender: Option<String>,
}

/// Result of a completed broadcast.
#[derive(Debug, Clone)]
pub struct BroadcastOutcome {
    /// Recipients delivered to.
    pub sent: u32,
    /// Recipients that failed. Never aborts the others.
    pub failed: u32,
    /// The stored notification record.
    pub notification: Notification,
}

/// Deduplicates, resolves cohorts, and fans out admin broadcasts.
#[derive(Debug, Clone)]
pub struct NotifyService {
    users: Arc<UserDirectory>,
    bookings: Arc<BookingStore>,
    log: Arc<NotificationLog>,
    mail: Arc<dyn MailTransport>,
    archive: Option<Arc<dyn RecordArchive>>,
    dedup_window: Duration,
    max_in_flight: usize,
}

impl NotifyService {
    /// Creates a new `NotifyService`.
    #[must_use]
    pub fn new(
        users: Arc<UserDirectory>,
        bookings: Arc<BookingStore>,
        log: Arc<NotificationLog>,
        mail: Arc<dyn MailTransport>,
        archive: Option<Arc<dyn RecordArchive>>,
        dedup_window: Duration,
        max_in_flight: usize,
    ) -> Self {
        Self {
            users,
            bookings,
            log,
            mail,
            archive,
            dedup_window,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Sends a broadcast to the resolved cohort.
    ///
    /// A `Pending` record claims the dedup key before any delivery, so an
    /// identical broadcast racing with this one is rejected even while
    /// dispatch is still in flight. Recipients are deduplicated by email
    /// address; deliveries run with bounded concurrency and are counted
    /// independently, so one failure never aborts the rest. Partial
    /// failure is an outcome, not an error.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidRequest`] for an empty subject or body.
    /// - [`CoreError::DuplicateRecent`] when an identical broadcast was
    ///   created inside the dedup window (including one still
    ///   dispatching); no additional record is written.
    pub async fn broadcast(&self, req: BroadcastRequest) -> Result<BroadcastOutcome, CoreError> {
        if req.subject.trim().is_empty() || req.html.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "subject and html body are required".to_string(),
            ));
        }

        let key = dedup_key(&req.subject, &req.title, &req.html, req.recipient_type);
        let now = Utc::now();
        let mut notification = Notification {
            notification_id: NotificationId::new(),
            subject: req.subject,
            title: req.title,
            html: req.html,
            message_type: req.message_type,
            recipient_type: req.recipient_type,
            dedup_key: key,
            status: NotificationStatus::Pending,
            sent_count: 0,
            failed_count: 0,
            error_summary: None,
            sender: req.sender,
            created_at: now,
        };
        if !self
            .log
            .try_claim(notification.clone(), self.dedup_window, now)
            .await
        {
            tracing::warn!(recipient_type = req.recipient_type.as_str(), "duplicate broadcast suppressed");
            return Err(CoreError::DuplicateRecent);
        }

        let recipients = self.resolve_cohort(req.recipient_type).await;
        let total = recipients.len();
        tracing::info!(
            recipient_type = req.recipient_type.as_str(),
            recipients = total,
            "broadcast dispatch started"
        );

        let results: Vec<bool> = stream::iter(recipients)
            .map(|account| {
                let mail = Arc::clone(&self.mail);
                let subject = notification.subject.clone();
                let title = notification.title.clone();
                let html = notification.html.clone();
                let message_type = notification.message_type.clone();
                async move {
                    mail.send_notification_email(
                        &account.email,
                        &subject,
                        &title,
                        &html,
                        &message_type,
                        &account.name,
                    )
                    .await
                }
            })
            .buffer_unordered(self.max_in_flight)
            .collect()
            .await;

        let sent = results.iter().filter(|ok| **ok).count() as u32;
        let failed = total as u32 - sent;
        notification.status = if failed == 0 {
            NotificationStatus::Sent
        } else {
            NotificationStatus::Failed
        };
        notification.sent_count = sent;
        notification.failed_count = failed;
        notification.error_summary =
            (failed > 0).then(|| format!("{failed} of {total} deliveries failed"));
        self.log.insert(notification.clone()).await;

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.archive_notification(&notification).await {
                tracing::warn!(notification_id = %notification.notification_id, error = %e, "notification archive failed");
            }
        }

        tracing::info!(
            notification_id = %notification.notification_id,
            sent,
            failed,
            "broadcast dispatch finished"
        );
        Ok(BroadcastOutcome {
            sent,
            failed,
            notification,
        })
    }

    /// Most recent broadcast records, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<Notification> {
        self.log.recent(limit).await
    }

    /// Maps a cohort to its member accounts, deduplicated by email.
    async fn resolve_cohort(&self, recipient_type: RecipientType) -> Vec<UserAccount> {
        let active = self.users.active_users().await;
        let filtered: Vec<UserAccount> = match recipient_type {
            RecipientType::All => active,
            RecipientType::Registered => active
                .into_iter()
                .filter(|u| u.role == UserRole::User)
                .collect(),
            RecipientType::Staff => active
                .into_iter()
                .filter(|u| matches!(u.role, UserRole::Staff | UserRole::Admin))
                .collect(),
            RecipientType::Participants => {
                let participants = self.bookings.distinct_booking_user_ids().await;
                active
                    .into_iter()
                    .filter(|u| participants.contains(&u.user_id))
                    .collect()
            }
        };

        // One send per unique address even when a user matches twice.
        let mut by_email: HashMap<String, UserAccount> = HashMap::new();
        for account in filtered {
            by_email.entry(account.email.to_lowercase()).or_insert(account);
        }
        let mut recipients: Vec<UserAccount> = by_email.into_values().collect();
        recipients.sort_by(|a, b| a.email.cmp(&b.email));
        recipients
    }
}
