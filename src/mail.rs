//! Email transport seam.
//!
//! Delivery itself is an external collaborator; the core only needs a
//! boolean outcome per recipient. The production binary wires
//! [`LogMailTransport`]; tests substitute recording or failing doubles.

use async_trait::async_trait;

/// Outbound email collaborator.
///
/// Implementations report success per recipient and must never panic —
/// a failed send is an accounting event, not an error path.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    /// Sends one notification email. Returns `true` on success.
    async fn send_notification_email(
        &self,
        to: &str,
        subject: &str,
        title: &str,
        html: &str,
        message_type: &str,
        recipient_name: &str,
    ) -> bool;
}

/// Transport that logs deliveries instead of sending them.
///
/// Stands in for the real mail collaborator in development and keeps the
/// dispatcher's accounting observable through tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send_notification_email(
        &self,
        to: &str,
        subject: &str,
        _title: &str,
        _html: &str,
        message_type: &str,
        recipient_name: &str,
    ) -> bool {
        tracing::info!(to, subject, message_type, recipient_name, "email dispatched");
        true
    }
}
