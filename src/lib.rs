//! # boxoffice
//!
//! Inventory allocation and notification dispatch core for an event
//! ticketing platform.
//!
//! The capacity ledger is the single mutation path for event inventory:
//! bookings reserve units atomically, cancellations credit them back and
//! trigger FIFO waitlist promotion, and admin broadcasts fan out email
//! delivery with content-hash deduplication. Payments and authentication
//! are upstream collaborators; the core consumes the identity they attach.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── BookingService / WaitlistService / NotifyService (service/)
//!     │
//!     ├── CapacityLedger, BookingStore, WaitlistStore (domain/)
//!     ├── MailTransport (mail/)
//!     │
//!     └── PostgreSQL record archive (persistence/, optional)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod persistence;
pub mod service;
