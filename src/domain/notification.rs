//! Broadcast notification records and the dedup log.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use super::NotificationId;

/// Named recipient cohort for a broadcast.
///
/// A closed set: cohorts are fixed queries, not runtime string dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    /// Every active user.
    All,
    /// Plain end-users (no operational role).
    Registered,
    /// Users holding at least one active booking.
    Participants,
    /// Users holding any operational role.
    Staff,
}

impl RecipientType {
    /// Stable string form used in dedup keys and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Registered => "registered",
            Self::Participants => "participants",
            Self::Staff => "staff",
        }
    }
}

/// Delivery outcome of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Created, dispatch not yet finished.
    Pending,
    /// Every recipient was delivered to.
    Sent,
    /// At least one recipient failed. `sent_count` still reflects the
    /// actual successes.
    Failed,
}

/// A broadcast notification record. Immutable once `Sent`/`Failed`
/// except for the count fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub notification_id: NotificationId,
    /// Email subject line.
    pub subject: String,
    /// Headline shown inside the message body.
    pub title: String,
    /// HTML body.
    pub html: String,
    /// Free-form message category (e.g. `"announcement"`).
    pub message_type: String,
    /// Cohort the broadcast targeted.
    pub recipient_type: RecipientType,
    /// Content hash used to suppress accidental duplicates.
    pub dedup_key: String,
    /// Delivery outcome.
    pub status: NotificationStatus,
    /// Number of recipients delivered to.
    pub sent_count: u32,
    /// Number of recipients that failed.
    pub failed_count: u32,
    /// Short description of what failed, when `status == Failed`.
    pub error_summary: Option<String>,
    /// Admin who triggered the broadcast (opaque collaborator identity).
    pub sender: Option<String>,
    /// Creation timestamp; anchor of the dedup window.
    pub created_at: DateTime<Utc>,
}

/// Computes the content hash over `(subject, title, html, recipient_type)`.
///
/// Fields are joined with a `0x1f` unit separator before hashing so that
/// boundary-shifted contents cannot collide.
#[must_use]
pub fn dedup_key(subject: &str, title: &str, html: &str, recipient_type: RecipientType) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    hasher.update([0x1f]);
    hasher.update(title.as_bytes());
    hasher.update([0x1f]);
    hasher.update(html.as_bytes());
    hasher.update([0x1f]);
    hasher.update(recipient_type.as_str().as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// In-memory notification log with dedup lookups.
#[derive(Debug, Default)]
pub struct NotificationLog {
    records: RwLock<HashMap<NotificationId, Notification>>,
}

impl NotificationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a record with the given dedup key was created
    /// within `window` before `now`.
    pub async fn seen_recently(&self, key: &str, window: Duration, now: DateTime<Utc>) -> bool {
        let map = self.records.read().await;
        map.values()
            .any(|n| n.dedup_key == key && now - n.created_at < window)
    }

    /// Atomically records a notification unless one with the same dedup
    /// key was created within `window` before `now`. The check and the
    /// insert happen under one write-lock hold, so two racing broadcasts
    /// with identical content can never both claim the key — even while
    /// the first is still dispatching. Returns `false` (and stores
    /// nothing) when a recent duplicate exists.
    pub async fn try_claim(
        &self,
        notification: Notification,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let mut map = self.records.write().await;
        let duplicate = map
            .values()
            .any(|n| n.dedup_key == notification.dedup_key && now - n.created_at < window);
        if duplicate {
            return false;
        }
        map.insert(notification.notification_id, notification);
        true
    }

    /// Inserts a notification record, replacing any earlier record with
    /// the same ID (a `Pending` claim being finalized).
    pub async fn insert(&self, notification: Notification) {
        let mut map = self.records.write().await;
        map.insert(notification.notification_id, notification);
    }

    /// Most recent records, newest first, capped at `limit`.
    pub async fn recent(&self, limit: usize) -> Vec<Notification> {
        let map = self.records.read().await;
        let mut all: Vec<Notification> = map.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all.truncate(limit);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_is_stable_and_content_sensitive() {
        let a = dedup_key("s", "t", "<p>h</p>", RecipientType::All);
        let b = dedup_key("s", "t", "<p>h</p>", RecipientType::All);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex sha-256

        assert_ne!(a, dedup_key("s", "t", "<p>h</p>", RecipientType::Staff));
        assert_ne!(a, dedup_key("s", "t!", "<p>h</p>", RecipientType::All));
        // The separator keeps shifted boundaries distinct.
        assert_ne!(
            dedup_key("ab", "c", "h", RecipientType::All),
            dedup_key("a", "bc", "h", RecipientType::All)
        );
    }

    fn record(key: &str, status: NotificationStatus, created_at: DateTime<Utc>) -> Notification {
        Notification {
            notification_id: NotificationId::new(),
            subject: "s".to_string(),
            title: "t".to_string(),
            html: "h".to_string(),
            message_type: "announcement".to_string(),
            recipient_type: RecipientType::All,
            dedup_key: key.to_string(),
            status,
            sent_count: 1,
            failed_count: 0,
            error_summary: None,
            sender: None,
            created_at,
        }
    }

    #[tokio::test]
    async fn seen_recently_respects_the_window() {
        let log = NotificationLog::new();
        let key = dedup_key("s", "t", "h", RecipientType::All);
        let now = Utc::now();
        log.insert(record(
            &key,
            NotificationStatus::Sent,
            now - Duration::minutes(10),
        ))
        .await;

        assert!(log.seen_recently(&key, Duration::minutes(30), now).await);
        assert!(
            !log.seen_recently(&key, Duration::minutes(30), now + Duration::minutes(25))
                .await
        );
        assert!(
            !log.seen_recently("other-key", Duration::minutes(30), now)
                .await
        );
    }

    #[tokio::test]
    async fn try_claim_admits_one_record_per_key_per_window() {
        let log = NotificationLog::new();
        let now = Utc::now();
        let window = Duration::minutes(30);

        assert!(
            log.try_claim(record("k", NotificationStatus::Pending, now), window, now)
                .await
        );
        // Same key inside the window: rejected, nothing stored.
        assert!(
            !log.try_claim(record("k", NotificationStatus::Pending, now), window, now)
                .await
        );
        assert_eq!(log.recent(10).await.len(), 1);

        // A different key claims independently; the original key frees up
        // once the window has passed.
        assert!(
            log.try_claim(record("other", NotificationStatus::Pending, now), window, now)
                .await
        );
        let later = now + Duration::minutes(31);
        assert!(
            log.try_claim(
                record("k", NotificationStatus::Pending, later),
                window,
                later
            )
            .await
        );
    }
}
