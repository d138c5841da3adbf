//! # Validation Module
//!
//! Input validation for vehicles, reservations and contact details.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (axum Json)                                   │
//! │  ├── Shape and type checks (dates parse, numbers are numbers)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, date order, email/phone shape, agencies          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK (end_date > start_date)                          │
//! │  └── Foreign key vehicle_id → vehicles.id                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{NewReservation, NewVehicle};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 8;

/// Maximum length of a vehicle name.
pub const MAX_VEHICLE_NAME_LEN: usize = 200;

/// Highest accepted daily rate, in whole currency units.
pub const MAX_DAILY_RATE: i64 = 1_000_000;

/// Longest rental, in billed days.
pub const MAX_RENTAL_DAYS: i64 = 365;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

// =============================================================================
// Reservation Validators
// =============================================================================

/// Validates a reservation request before any store access.
///
/// ## Rules
/// - `carId`, `startDate`, `endDate`, `customerName`, `customerEmail`,
///   `departureAgency`, `returnAgency` are present and non-blank
/// - `startDate < endDate`, at most [`MAX_RENTAL_DAYS`] apart
///
/// ```text
/// POST /reservations
///      │
///      ▼
/// validate_new_reservation ← THIS FUNCTION
///      │
///      ├── missing fields?  → MissingFields (400)
///      ├── start >= end?    → InvalidDateRange (400)
///      ├── too many days?   → RentalTooLong (400)
///      │
///      └── OK → vehicle lookup → conflict check → price → insert
/// ```
pub fn validate_new_reservation(new: &NewReservation) -> ValidationResult<()> {
    let mut missing = Vec::new();

    if is_blank(&new.vehicle_id) {
        missing.push("carId");
    }
    if new.start_date.is_none() {
        missing.push("startDate");
    }
    if new.end_date.is_none() {
        missing.push("endDate");
    }
    if is_blank(&new.customer_name) {
        missing.push("customerName");
    }
    if is_blank(&new.customer_email) {
        missing.push("customerEmail");
    }
    if is_blank(&new.departure_agency) {
        missing.push("departureAgency");
    }
    if is_blank(&new.return_agency) {
        missing.push("returnAgency");
    }

    if !missing.is_empty() {
        return Err(ValidationError::MissingFields {
            fields: missing.into_iter().map(String::from).collect(),
        });
    }

    if let (Some(start), Some(end)) = (new.start_date, new.end_date) {
        validate_rental_period(start, end)?;
    }

    Ok(())
}

/// Validates that `start` is strictly before `end`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rentline_core::validation::validate_date_order;
///
/// let d = |day| NaiveDate::from_ymd_opt(2025, 11, day).unwrap();
/// assert!(validate_date_order(d(10), d(12)).is_ok());
/// assert!(validate_date_order(d(12), d(12)).is_err());
/// ```
pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    if start >= end {
        return Err(ValidationError::InvalidDateRange);
    }
    Ok(())
}

/// Validates date order and rental length.
pub fn validate_rental_period(start: NaiveDate, end: NaiveDate) -> ValidationResult<()> {
    validate_date_order(start, end)?;

    if (end - start).num_days() > MAX_RENTAL_DAYS {
        return Err(ValidationError::RentalTooLong {
            max: MAX_RENTAL_DAYS,
        });
    }
    Ok(())
}

/// Validates an agency name against the known list.
///
/// When `enforce` is false any non-blank name is accepted.
pub fn validate_agency(field: &str, agency: &str, known: &[String], enforce: bool) -> ValidationResult<()> {
    let agency = agency.trim();
    if agency.is_empty() {
        return Err(ValidationError::required(field));
    }

    if enforce && !known.iter().any(|k| k == agency) {
        return Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: known.to_vec(),
        });
    }

    Ok(())
}

// =============================================================================
// Vehicle Validators
// =============================================================================

/// Validates a vehicle creation request.
///
/// ## Rules
/// - `name`, `price`, `image`, `locationAgency` are present
/// - `price` (daily rate) is strictly positive
pub fn validate_new_vehicle(new: &NewVehicle) -> ValidationResult<()> {
    let mut missing = Vec::new();
    if is_blank(&new.name) {
        missing.push("name");
    }
    if new.daily_rate.is_none() {
        missing.push("price");
    }
    if is_blank(&new.image) {
        missing.push("image");
    }
    if is_blank(&new.location_agency) {
        missing.push("locationAgency");
    }
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields {
            fields: missing.into_iter().map(String::from).collect(),
        });
    }

    if let Some(name) = new.name.as_deref() {
        validate_vehicle_name(name)?;
    }
    if let Some(rate) = new.daily_rate {
        validate_daily_rate(rate)?;
    }

    Ok(())
}

/// Validates a vehicle display name.
pub fn validate_vehicle_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_VEHICLE_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_VEHICLE_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a daily rate (whole currency units, in `1..=MAX_DAILY_RATE`).
pub fn validate_daily_rate(rate: i64) -> ValidationResult<()> {
    if rate <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    if rate > MAX_DAILY_RATE {
        return Err(ValidationError::TooLarge {
            field: "price".to_string(),
            max: MAX_DAILY_RATE,
        });
    }
    Ok(())
}

// =============================================================================
// Contact Validators
// =============================================================================

/// Validates an email address shape: `local@domain.tld`, no whitespace.
///
/// ## Example
/// ```rust
/// use rentline_core::validation::validate_email;
///
/// assert!(validate_email("contact@fandiauto.com").is_ok());
/// assert!(validate_email("contact@fandiauto").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::invalid_format("email", "expected name@domain.tld");

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    // Needs a dot with something on both sides somewhere in the domain
    let has_dotted_part = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if !has_dotted_part {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a phone number: digits, spaces, `+ - ( )` only, and at least
/// [`MIN_PHONE_DIGITS`] digits.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')');

    if phone.is_empty() || !phone.chars().all(allowed) {
        return Err(ValidationError::invalid_format(
            "phone",
            "only digits, spaces and + - ( ) are allowed",
        ));
    }

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::invalid_format(
            "phone",
            format!("must contain at least {} digits", MIN_PHONE_DIGITS),
        ));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn complete_request() -> NewReservation {
        NewReservation {
            vehicle_id: Some("car1".into()),
            start_date: Some(date("2025-11-10")),
            end_date: Some(date("2025-11-12")),
            departure_agency: Some("Agence ANISTOUR Oran".into()),
            return_agency: Some("Agence ANISTOUR Oran".into()),
            customer_name: Some("Ahmed Alami".into()),
            customer_email: Some("ahmed@example.com".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_reservation_is_valid() {
        assert!(validate_new_reservation(&complete_request()).is_ok());
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut req = complete_request();
        req.vehicle_id = None;
        req.customer_email = Some("   ".into());

        let err = validate_new_reservation(&req).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["carId".into(), "customerEmail".into()]
            }
        );
    }

    #[test]
    fn test_inverted_or_empty_range_rejected() {
        let mut req = complete_request();
        req.end_date = req.start_date;
        assert_eq!(
            validate_new_reservation(&req).unwrap_err(),
            ValidationError::InvalidDateRange
        );

        req.end_date = Some(date("2025-11-01"));
        assert_eq!(
            validate_new_reservation(&req).unwrap_err(),
            ValidationError::InvalidDateRange
        );
    }

    #[test]
    fn test_rental_length_is_capped() {
        let start = date("2025-11-10");
        let end = start + chrono::Duration::days(MAX_RENTAL_DAYS);
        assert!(validate_rental_period(start, end).is_ok());

        let mut req = complete_request();
        req.end_date = Some(end + chrono::Duration::days(1));
        assert_eq!(
            validate_new_reservation(&req).unwrap_err(),
            ValidationError::RentalTooLong { max: MAX_RENTAL_DAYS }
        );
    }

    #[test]
    fn test_daily_rate_bounds() {
        assert!(validate_daily_rate(1).is_ok());
        assert!(validate_daily_rate(MAX_DAILY_RATE).is_ok());
        assert_eq!(
            validate_daily_rate(100_000_000_000_000_000).unwrap_err(),
            ValidationError::TooLarge {
                field: "price".into(),
                max: MAX_DAILY_RATE
            }
        );
    }

    #[test]
    fn test_validate_agency() {
        let known = vec!["Aéroport de Chlef".to_string()];
        assert!(validate_agency("returnAgency", "Aéroport de Chlef", &known, true).is_ok());
        assert!(validate_agency("returnAgency", "Nowhere", &known, true).is_err());
        assert!(validate_agency("returnAgency", "Nowhere", &known, false).is_ok());
        assert!(validate_agency("returnAgency", " ", &known, false).is_err());
    }

    #[test]
    fn test_validate_new_vehicle() {
        let ok = NewVehicle {
            name: Some("Clio 5".into()),
            daily_rate: Some(35),
            image: Some("images/clio5.jpg".into()),
            location_agency: Some("Agence ANISTOUR Oran".into()),
            ..Default::default()
        };
        assert!(validate_new_vehicle(&ok).is_ok());

        let zero_rate = NewVehicle {
            daily_rate: Some(0),
            ..ok.clone()
        };
        assert!(matches!(
            validate_new_vehicle(&zero_rate),
            Err(ValidationError::MustBePositive { .. })
        ));

        let missing = NewVehicle::default();
        assert!(matches!(
            validate_new_vehicle(&missing),
            Err(ValidationError::MissingFields { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("contact@fandiauto.com").is_ok());
        assert!(validate_email("a.b@c.d").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("user@.com").is_err());
        assert!(validate_email("us er@domain.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+213 771 39 14 80").is_ok());
        assert!(validate_phone("(021) 23-45-67-89").is_ok());

        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("+213 771 39 14 8O").is_err());
        assert!(validate_phone("").is_err());
    }
}
