//! Type-safe identifiers for all core entities.
//!
//! Each identifier is a newtype wrapper around [`uuid::Uuid`] (v4) so that,
//! for example, a booking ID can never be passed where an event ID is
//! expected. All wrappers share the same surface, generated by a local macro.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an event.
    ///
    /// Dictionary key in the [`super::CapacityLedger`]; every booking and
    /// waitlist entry references exactly one.
    EventId
}

uuid_id! {
    /// Unique identifier for a booking.
    BookingId
}

uuid_id! {
    /// Opaque per-unit ticket identifier, minted at booking time.
    TicketId
}

uuid_id! {
    /// Unique identifier for a waitlist entry.
    EntryId
}

uuid_id! {
    /// Unique identifier for a broadcast notification record.
    NotificationId
}

uuid_id! {
    /// Unique identifier for a user account.
    UserId
}

uuid_id! {
    /// Opaque handle for a single capacity decrement.
    ///
    /// Returned by [`super::CapacityLedger::reserve`] and redeemed at most
    /// once by `release`; releasing the same token twice is a no-op.
    ReservationToken
}
