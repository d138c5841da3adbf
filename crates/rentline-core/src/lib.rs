//! # rentline-core: Pure Business Logic for Rentline
//!
//! Pricing, availability and validation rules for the car rental backend,
//! as pure functions with no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /cars  /reservations  /quote  /settings  /payment-settings   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rentline-booking                             │   │
//! │  │    BookingService (create/update/quote) + RelocationReconciler  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rentline-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────────┐ ┌────────────┐      │   │
//! │  │   │  types  │ │ pricing │ │ availability │ │ validation │      │   │
//! │  │   │ Vehicle │ │ tiers   │ │  DateRange   │ │  required  │      │   │
//! │  │   │ Reserv. │ │ weekend │ │  overlap     │ │  formats   │      │   │
//! │  │   └─────────┘ └─────────┘ └──────────────┘ └────────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rentline-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Vehicle, Reservation, Setting, PaymentSettings)
//! - [`money`] - Integer-cent Money type
//! - [`pricing`] - Weekend surcharge + duration discount engine
//! - [`availability`] - Inclusive date-range overlap checks
//! - [`validation`] - Input rules
//! - [`clock`] - Injectable time source
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use rentline_core::pricing::{compute_price, RateCard};
//!
//! let clio = RateCard::new("car1", "Clio 5", 35);
//! let mon = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
//! let fri = NaiveDate::from_ymd_opt(2025, 11, 14).unwrap();
//!
//! // 4 weekdays → 10% duration discount
//! let quote = compute_price(&clio, mon, fri, true);
//! assert_eq!(quote.subtotal, 140);
//! assert_eq!(quote.discount_amount, 14);
//! assert_eq!(quote.total, 126);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod clock;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::DateRange;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{compute_price, FallbackRates, PriceBreakdown, RateCard};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Agencies vehicles can be picked up from and returned to.
///
/// Used as the default agency list when configuration does not provide one.
pub const DEFAULT_AGENCIES: [&str; 5] = [
    "Aéroport Tlemcen - Messali El Hadj",
    "Aéroport d'Oran - Ahmed Ben Bella",
    "Agence ANISTOUR Oran",
    "Agence ANISTOUR Tlemcen",
    "Aéroport de Chlef",
];
