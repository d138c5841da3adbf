//! Booking rules that vary per deployment.

use rentline_core::{FallbackRates, DEFAULT_AGENCIES};

/// Settings consumed by [`BookingService`](crate::BookingService).
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Known pickup/return agencies.
    pub agencies: Vec<String>,

    /// Reject reservations whose agencies are not in `agencies`.
    /// Default: false
    pub enforce_agencies: bool,

    /// Rates used by quotes when the vehicle record is missing.
    pub fallback_rates: FallbackRates,
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            agencies: DEFAULT_AGENCIES.iter().map(|a| a.to_string()).collect(),
            enforce_agencies: false,
            fallback_rates: FallbackRates::default_fleet(),
        }
    }
}
