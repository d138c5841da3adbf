//! # Availability Checker
//!
//! Decides whether a candidate date range collides with existing bookings.
//!
//! ## Overlap Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  conflict ⇔ candidate.start <= existing.end                             │
//! │           ∧ candidate.end   >= existing.start                           │
//! │                                                                         │
//! │  Both bounds are inclusive, so touching ranges collide:                 │
//! │                                                                         │
//! │  existing    [10 ─────── 12]                                            │
//! │  candidate               [12 ─────── 14]     ← conflict (same-day       │
//! │                                                 handoff not allowed)    │
//! │  candidate                  [13 ──── 15]     ← free                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers pass only ranges of reservations whose status blocks
//! availability, for the same vehicle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Reservation;

/// A closed interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Returns true if the two ranges share at least one day, endpoints included.
    #[inline]
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl From<&Reservation> for DateRange {
    fn from(r: &Reservation) -> Self {
        DateRange::new(r.start_date, r.end_date)
    }
}

/// Returns true if `candidate` overlaps any of `existing`.
pub fn has_conflict(candidate: &DateRange, existing: &[DateRange]) -> bool {
    existing.iter().any(|range| candidate.overlaps(range))
}

/// Filters `reservations` down to the blocking ones and checks `candidate`
/// against them.
pub fn conflicts_with_reservations(candidate: &DateRange, reservations: &[Reservation]) -> bool {
    reservations
        .iter()
        .filter(|r| r.blocks_availability())
        .any(|r| candidate.overlaps(&DateRange::from(r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewReservation, ReservationStatus};
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end))
    }

    fn reservation(start: &str, end: &str, status: ReservationStatus) -> Reservation {
        let new = NewReservation {
            vehicle_id: Some("car1".into()),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
            status: Some(status),
            ..Default::default()
        };
        Reservation::from_new("r", new, 0, Utc::now())
    }

    #[test]
    fn test_overlap_detected() {
        let existing = [range("2025-11-11", "2025-11-13")];
        assert!(has_conflict(&range("2025-11-10", "2025-11-12"), &existing));
    }

    #[test]
    fn test_touching_endpoints_conflict() {
        // Candidate ends on the 12th, existing starts on the 12th
        let existing = [range("2025-11-12", "2025-11-14")];
        assert!(has_conflict(&range("2025-11-10", "2025-11-12"), &existing));

        // Candidate starts the day the existing booking is returned
        let existing = [range("2025-11-08", "2025-11-10")];
        assert!(has_conflict(&range("2025-11-10", "2025-11-12"), &existing));
    }

    #[test]
    fn test_disjoint_ranges_are_free() {
        let existing = [range("2025-11-13", "2025-11-15")];
        assert!(!has_conflict(&range("2025-11-10", "2025-11-12"), &existing));
        assert!(!has_conflict(&range("2025-11-16", "2025-11-18"), &existing));
    }

    #[test]
    fn test_containment_conflicts() {
        let existing = [range("2025-11-01", "2025-11-30")];
        assert!(has_conflict(&range("2025-11-10", "2025-11-12"), &existing));
        let existing = [range("2025-11-10", "2025-11-11")];
        assert!(has_conflict(&range("2025-11-01", "2025-11-30"), &existing));
    }

    #[test]
    fn test_empty_existing_is_free() {
        assert!(!has_conflict(&range("2025-11-10", "2025-11-12"), &[]));
    }

    #[test]
    fn test_only_accepted_reservations_block() {
        let candidate = range("2025-11-10", "2025-11-12");
        let pending = reservation("2025-11-10", "2025-11-12", ReservationStatus::Pending);
        let refused = reservation("2025-11-10", "2025-11-12", ReservationStatus::Refused);
        assert!(!conflicts_with_reservations(&candidate, &[pending, refused]));

        let accepted = reservation("2025-11-11", "2025-11-13", ReservationStatus::Accepted);
        assert!(conflicts_with_reservations(&candidate, &[accepted]));
    }
}
