//! # Money Module
//!
//! Provides the `Money` type used by the pricing engine.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE WEEKEND SURCHARGE PROBLEM                                          │
//! │                                                                         │
//! │  Daily rate 37, weekend surcharge 20%:                                  │
//! │    37 × 0.2 = 7.4000000000000004 in floating point                      │
//! │                                                                         │
//! │  Summed over a month of weekends the error drifts, and the final       │
//! │  "round once on the aggregate" step can land on the wrong side.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                             │
//! │    3700 cents × 2000 bps / 10000 = 740 cents, exactly                   │
//! │    Sum in cents, round to whole units once at the end                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rates and reservation totals are stored in whole currency units, so
//! `Money` offers `from_units` / `units` conversions next to the cent API.
//!
//! ## Usage
//! ```rust
//! use rentline_core::money::Money;
//!
//! let rate = Money::from_units(35);
//! let surcharge = rate.percentage(2000); // 20%
//! assert_eq!(surcharge.cents(), 700);
//! assert_eq!((rate + surcharge).units(), 42);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Cents per whole currency unit.
pub const CENTS_PER_UNIT: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Vehicle.daily_rate (units) ──► Money::from_units ──► DayCharge.price
///                                                          │
///                                    Σ day charges ◄───────┘
///                                          │
///                                    round_to_unit ──► subtotal ──► total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units, saturating at the
    /// `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(35).cents(), 3500);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(CENTS_PER_UNIT))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in whole units, rounding half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4249).units(), 42);
    /// assert_eq!(Money::from_cents(4250).units(), 43);
    /// ```
    #[inline]
    pub const fn units(&self) -> i64 {
        if self.0 >= 0 {
            (self.0 + CENTS_PER_UNIT / 2) / CENTS_PER_UNIT
        } else {
            (self.0 - CENTS_PER_UNIT / 2) / CENTS_PER_UNIT
        }
    }

    /// Rounds to the nearest whole unit, keeping the cent representation.
    #[inline]
    pub const fn round_to_unit(&self) -> Self {
        Money::from_units(self.units())
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % CENTS_PER_UNIT).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns `bps` basis points of this amount, rounded to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 rounds
    /// half up for the non-negative amounts pricing deals with.
    ///
    /// ## Example
    /// ```rust
    /// use rentline_core::money::Money;
    ///
    /// let subtotal = Money::from_units(240);
    /// assert_eq!(subtotal.percentage(1500).cents(), 3600); // 15%
    /// ```
    pub fn percentage(&self, bps: u32) -> Money {
        // i128 keeps long rentals of expensive vehicles from overflowing
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented rendering; front-ends format for their own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:02} €",
            sign,
            (self.0 / CENTS_PER_UNIT).abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a day count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, days: i64) -> Self {
        Money(self.0 * days)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
