//! Seat map resolver: deterministic layout and seat-set validation.
//!
//! The layout is never persisted. It is recomputed from `capacity` alone on
//! every call, so the resolver and every caller always agree on the same
//! grid: seats numbered `1..=capacity`, assigned left-to-right and
//! top-to-bottom in rows of `columns` seats, last row possibly partial.

use std::collections::HashSet;

use crate::error::CoreError;

/// Default number of seats per row.
pub const DEFAULT_COLUMNS: u32 = 10;

/// Computes the row-major seat layout for the given capacity.
///
/// Pure and deterministic: `ceil(capacity / columns)` rows of ascending
/// seat numbers. A zero `columns` is treated as [`DEFAULT_COLUMNS`].
#[must_use]
pub fn layout(capacity: u32, columns: u32) -> Vec<Vec<u32>> {
    let columns = if columns == 0 { DEFAULT_COLUMNS } else { columns };
    let mut rows = Vec::with_capacity(capacity.div_ceil(columns) as usize);
    let mut seat = 1u32;
    while seat <= capacity {
        let end = seat.saturating_add(columns - 1).min(capacity);
        rows.push((seat..=end).collect());
        seat = end + 1;
    }
    rows
}

/// Validates a requested seat set against the currently booked seats.
///
/// Checks, in order: cardinality (`requested.len() == quantity`), range
/// (`1..=capacity`), duplicates within the request, then conflicts —
/// failing on the first seat that is both requested and already booked.
///
/// # Errors
///
/// - [`CoreError::InvalidRequest`] on cardinality, range, or duplicate
///   violations (user sent a malformed selection).
/// - [`CoreError::SeatConflict`] with the first offending seat number.
pub fn validate_seats(
    requested: &[u32],
    booked: &HashSet<u32>,
    quantity: u32,
    capacity: u32,
) -> Result<(), CoreError> {
    if requested.len() != quantity as usize {
        return Err(CoreError::InvalidRequest(format!(
            "selected {} seats for a quantity of {quantity}",
            requested.len()
        )));
    }
    let mut seen = HashSet::with_capacity(requested.len());
    for &seat in requested {
        if seat == 0 || seat > capacity {
            return Err(CoreError::InvalidRequest(format!(
                "seat {seat} is outside 1..={capacity}"
            )));
        }
        if !seen.insert(seat) {
            return Err(CoreError::InvalidRequest(format!(
                "seat {seat} requested twice"
            )));
        }
        if booked.contains(&seat) {
            return Err(CoreError::SeatConflict(seat));
        }
    }
    Ok(())
}
