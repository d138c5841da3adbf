//! # Clock
//!
//! Time source abstraction. Only the relocation reconciler and record
//! timestamps ask for "now"; pricing and availability never do.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Mutex;

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day (UTC).
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. For tests.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Mutex::new(now),
        }
    }

    /// A clock pinned to midday on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self::new(noon)
    }

    /// Moves the clock to midday on `date`.
    pub fn set_date(&self, date: NaiveDate) {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        if let Ok(mut now) = self.now.lock() {
            *now = noon;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 11, 12).unwrap();
        let clock = FixedClock::on(day);
        assert_eq!(clock.today(), day);

        let next = day.succ_opt().unwrap();
        clock.set_date(next);
        assert_eq!(clock.today(), next);
    }
}
