//! # Booking Errors
//!
//! Outcomes of lifecycle operations that are not a success.
//!
//! ```text
//! BookingError            HTTP (apps/api)
//! ─────────────────────   ───────────────
//! Validation           →  400
//! VehicleNotFound      →  404
//! ReservationNotFound  →  404
//! Conflict             →  409
//! UnknownRate          →  404
//! Store                →  500
//! ReconcilerStopped    →  500
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use rentline_core::{CoreError, ValidationError};
use rentline_db::DbError;

/// Booking service errors.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Request failed input validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Referenced vehicle does not exist.
    #[error("Car not found")]
    VehicleNotFound { vehicle_id: String },

    /// Referenced reservation does not exist.
    #[error("Reservation not found")]
    ReservationNotFound { id: String },

    /// An accepted reservation of the same vehicle overlaps the dates.
    ///
    /// ## When This Occurs
    /// - Overlap on any day, endpoints included (a booking ending on the
    ///   12th blocks one starting on the 12th)
    #[error("Reservation conflict")]
    Conflict {
        vehicle_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// No vehicle record and no fallback rate for a quote.
    #[error("No rate known for car {vehicle_id}")]
    UnknownRate { vehicle_id: String },

    /// Storage failure.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    /// The reconciler task is no longer running.
    #[error("Reconciler stopped")]
    ReconcilerStopped,
}

impl From<CoreError> for BookingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownRate { vehicle_id } => BookingError::UnknownRate { vehicle_id },
            CoreError::Validation(v) => BookingError::Validation(v),
        }
    }
}

/// Result type for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;
