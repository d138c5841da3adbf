//! # Error Types
//!
//! Domain-specific error types for rentline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rentline-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rentline-db          └── DbError       - Database failures            │
//! │  rentline-booking     └── BookingError  - Lifecycle outcomes           │
//! │  apps/api             └── ApiError      - HTTP status + JSON body      │
//! │                                                                         │
//! │  Flow: ValidationError → BookingError → ApiError → 400                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No rate could be resolved for a vehicle.
    ///
    /// ## When This Occurs
    /// - The vehicle record is missing and no fallback rate is configured
    #[error("No rate known for vehicle {vehicle_id}")]
    UnknownRate { vehicle_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// They are never retried; the caller fixes the input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Several required fields are missing.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds its upper bound.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: i64 },

    /// Invalid format (e.g., malformed email or phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// End date is not after start date.
    #[error("End date must be after start date")]
    InvalidDateRange,

    /// Rental spans more days than allowed.
    #[error("Rental period cannot exceed {max} days")]
    RentalTooLong { max: i64 },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("carId").to_string(), "carId is required");
        assert_eq!(
            ValidationError::InvalidDateRange.to_string(),
            "End date must be after start date"
        );
        let err = ValidationError::MissingFields {
            fields: vec!["carId".into(), "startDate".into()],
        };
        assert_eq!(err.to_string(), "Missing required fields: carId, startDate");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
