//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::UserDirectory;
use crate::service::{BookingService, NotifyService, WaitlistService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking transaction coordinator.
    pub booking_service: Arc<BookingService>,
    /// Waitlist promotion engine.
    pub waitlist_service: Arc<WaitlistService>,
    /// Notification dispatcher.
    pub notify_service: Arc<NotifyService>,
    /// User directory for account registration.
    pub users: Arc<UserDirectory>,
}
