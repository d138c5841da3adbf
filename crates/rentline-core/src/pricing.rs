//! # Pricing Engine
//!
//! Turns a daily rate and a date range into an itemized price.
//!
//! ## Computation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [start, end)  ──► one DayCharge per calendar day (end excluded)       │
//! │                                                                         │
//! │  Mon  Tue  Wed  Thu  Fri  Sat        Sun                                │
//! │  100  100  100  100  100  100+20     100+20    (surcharge 20% Sat/Sun)  │
//! │   └────────────────────┬──────────────────┘                             │
//! │                        ▼                                                │
//! │  subtotal = round(Σ day charges)        rounding happens ONCE           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  tier = first of [15d → 20%, 8d → 15%, 4d → 10%] with days ≥ min        │
//! │  discount = round(subtotal × tier)                                      │
//! │  total    = subtotal − discount                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is pure: no clock, no I/O. An empty or inverted range
//! yields a zero breakdown; callers reject inverted ranges before
//! getting here.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Vehicle;

// =============================================================================
// Constants
// =============================================================================

/// Weekend surcharge in basis points (20%).
pub const WEEKEND_SURCHARGE_BPS: u32 = 2000;

/// A duration discount tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountTier {
    /// Minimum billed days for the tier to apply.
    pub min_days: i64,
    /// Discount in basis points.
    pub bps: u32,
    /// Human-readable label shown on quotes.
    pub label: &'static str,
}

/// Duration discounts, highest threshold first. First match wins.
pub const DISCOUNT_TIERS: [DiscountTier; 3] = [
    DiscountTier {
        min_days: 15,
        bps: 2000,
        label: "20% (15+ days)",
    },
    DiscountTier {
        min_days: 8,
        bps: 1500,
        label: "15% (8-14 days)",
    },
    DiscountTier {
        min_days: 4,
        bps: 1000,
        label: "10% (4-7 days)",
    },
];

/// Returns the discount tier for a rental of `days` billed days.
pub fn discount_tier(days: i64) -> Option<&'static DiscountTier> {
    DISCOUNT_TIERS.iter().find(|tier| days >= tier.min_days)
}

/// Returns true for Saturday and Sunday.
#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

// =============================================================================
// Rate Card
// =============================================================================

/// What the engine needs to know about a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCard {
    pub vehicle_id: String,
    pub label: String,
    /// Daily base rate in whole currency units.
    pub daily_rate: i64,
}

impl RateCard {
    pub fn new(vehicle_id: impl Into<String>, label: impl Into<String>, daily_rate: i64) -> Self {
        RateCard {
            vehicle_id: vehicle_id.into(),
            label: label.into(),
            daily_rate,
        }
    }
}

/// Fixed per-vehicle rates used only when a vehicle record cannot be found.
///
/// Injected from configuration; never mutated after startup.
#[derive(Debug, Clone, Default)]
pub struct FallbackRates {
    cards: HashMap<String, RateCard>,
}

impl FallbackRates {
    /// An empty table (no fallback at all).
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rates of the original five-car fleet.
    pub fn default_fleet() -> Self {
        Self::from_cards([
            RateCard::new("car1", "Clio 5", 35),
            RateCard::new("car2", "Audi A4", 85),
            RateCard::new("car3", "Mercedes CLA 220", 120),
            RateCard::new("car4", "Dacia Logan", 45),
            RateCard::new("car5", "Peugeot 308", 65),
        ])
    }

    pub fn from_cards(cards: impl IntoIterator<Item = RateCard>) -> Self {
        FallbackRates {
            cards: cards
                .into_iter()
                .map(|card| (card.vehicle_id.clone(), card))
                .collect(),
        }
    }

    pub fn get(&self, vehicle_id: &str) -> Option<&RateCard> {
        self.cards.get(vehicle_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Picks the rate card for `vehicle_id`: the live vehicle record when there
/// is one, otherwise the fallback table.
pub fn resolve_rate(
    vehicle_id: &str,
    vehicle: Option<&Vehicle>,
    fallback: &FallbackRates,
) -> CoreResult<RateCard> {
    if let Some(vehicle) = vehicle {
        return Ok(vehicle.rate_card());
    }

    fallback
        .get(vehicle_id)
        .cloned()
        .ok_or_else(|| CoreError::UnknownRate {
            vehicle_id: vehicle_id.to_string(),
        })
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Price of a single billed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DayCharge {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub is_weekend: bool,
    /// Base rate plus surcharge, in cents (surcharges can be fractional).
    pub price_cents: i64,
}

/// Itemized result of [`compute_price`]. Amounts are whole currency units
/// unless the field name says otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Vehicle label.
    #[serde(rename = "car")]
    pub vehicle: String,
    #[serde(rename = "carId")]
    pub vehicle_id: String,
    pub days: i64,
    pub base_rate: i64,
    /// Sum of base rates, before surcharge.
    pub base_total: i64,
    /// Weekend surcharge, rounded for display.
    pub weekend_extra: i64,
    /// `round(base + surcharge)`, before discount.
    pub subtotal: i64,
    pub has_discount: bool,
    /// Applied discount in basis points (0 when none).
    pub discount_bps: u32,
    pub discount_label: Option<String>,
    pub discount_amount: i64,
    pub total: i64,
    pub breakdown: Vec<DayCharge>,
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the itemized price of renting `rate` over `[start, end)`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use rentline_core::pricing::{compute_price, RateCard};
///
/// let card = RateCard::new("car9", "Test", 100);
/// let sat = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
/// let mon = NaiveDate::from_ymd_opt(2025, 11, 17).unwrap();
///
/// let price = compute_price(&card, sat, mon, false);
/// assert_eq!(price.base_total, 200);
/// assert_eq!(price.weekend_extra, 40);
/// assert_eq!(price.total, 240);
/// ```
pub fn compute_price(
    rate: &RateCard,
    start: NaiveDate,
    end: NaiveDate,
    apply_discount: bool,
) -> PriceBreakdown {
    let base_rate = Money::from_units(rate.daily_rate);
    let surcharge = base_rate.percentage(WEEKEND_SURCHARGE_BPS);

    let breakdown: Vec<DayCharge> = start
        .iter_days()
        .take_while(|day| *day < end)
        .map(|date| {
            let is_weekend = is_weekend(date);
            let price = if is_weekend { base_rate + surcharge } else { base_rate };
            DayCharge {
                date,
                is_weekend,
                price_cents: price.cents(),
            }
        })
        .collect();

    let days = breakdown.len() as i64;
    let weekend_days = breakdown.iter().filter(|d| d.is_weekend).count() as i64;

    let base_total = base_rate * days;
    let weekend_extra = surcharge * weekend_days;
    let subtotal = (base_total + weekend_extra).round_to_unit();

    let tier = if apply_discount { discount_tier(days) } else { None };
    let discount = tier
        .map(|t| subtotal.percentage(t.bps).round_to_unit())
        .unwrap_or_default();
    let total = subtotal - discount;

    PriceBreakdown {
        vehicle: rate.label.clone(),
        vehicle_id: rate.vehicle_id.clone(),
        days,
        base_rate: rate.daily_rate,
        base_total: base_total.units(),
        weekend_extra: weekend_extra.units(),
        subtotal: subtotal.units(),
        has_discount: tier.is_some(),
        discount_bps: tier.map(|t| t.bps).unwrap_or(0),
        discount_label: tier.map(|t| t.label.to_string()),
        discount_amount: discount.units(),
        total: total.units(),
        breakdown,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
