//! Service layer: booking coordination, waitlist promotion, and
//! notification dispatch.

pub mod booking_service;
pub mod notify_service;
pub mod waitlist_service;

pub use booking_service::{BookingService, CreateBooking};
pub use notify_service::{BroadcastOutcome, BroadcastRequest, NotifyService};
pub use waitlist_service::{PositionedEntry, WaitlistService};
