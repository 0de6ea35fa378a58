//! Domain layer: identifiers, inventory ledger, seat maps, and the
//! booking, waitlist, notification, and user tables.
//!
//! Every capacity mutation goes through [`CapacityLedger`]; derived state
//! (booked seats, waitlist positions) is recomputed from the tables on
//! read and never cached.

pub mod booking;
pub mod booking_store;
pub mod event;
pub mod ids;
pub mod ledger;
pub mod notification;
pub mod seat_map;
pub mod users;
pub mod waitlist;

pub use booking::{Booking, BookingStatus};
pub use booking_store::BookingStore;
pub use event::{EventRecord, TicketType};
pub use ids::{
    BookingId, EntryId, EventId, NotificationId, ReservationToken, TicketId, UserId,
};
pub use ledger::CapacityLedger;
pub use notification::{Notification, NotificationLog, NotificationStatus, RecipientType};
pub use users::{UserAccount, UserDirectory, UserRole};
pub use waitlist::{WaitlistEntry, WaitlistStatus, WaitlistStore};
