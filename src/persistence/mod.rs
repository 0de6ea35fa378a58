//! Durable record archive behind a swappable seam.
//!
//! The in-memory tables are the authoritative live state; the archive is
//! a durable copy of finished records. It is the one step of the booking
//! commit sequence that can fail after capacity was reserved, which is
//! why it sits behind a trait: tests inject a failing archive to exercise
//! the compensating release.

pub mod postgres;

use async_trait::async_trait;

pub use postgres::PostgresArchive;

use crate::domain::{Booking, Notification};
use crate::error::CoreError;

/// Durable storage for finished booking and notification records.
#[async_trait]
pub trait RecordArchive: Send + Sync + std::fmt::Debug {
    /// Writes a confirmed booking.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PersistenceError`] on storage failure; the
    /// caller then compensates by releasing the reservation.
    async fn archive_booking(&self, booking: &Booking) -> Result<(), CoreError>;

    /// Marks an archived booking cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PersistenceError`] on storage failure.
    async fn mark_booking_cancelled(&self, booking: &Booking) -> Result<(), CoreError>;

    /// Writes a finished notification record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::PersistenceError`] on storage failure.
    async fn archive_notification(&self, notification: &Notification) -> Result<(), CoreError>;
}
