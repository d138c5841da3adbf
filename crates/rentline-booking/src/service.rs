//! # Booking Service
//!
//! Reservation lifecycle: create, update, delete and quote.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewReservation                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_new_reservation ──► 400 MissingFields / InvalidDateRange      │
//! │  validate_agency (x2)     ──► 400 NotAllowed (when enforced)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  vehicles().get_by_id     ──► 404 VehicleNotFound                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────── per-vehicle lock held ─────────────┐                     │
//! │  │  price = supplied or compute_price(discount)   │                     │
//! │  │  insert_checked (overlap check + INSERT, 1 tx) │──► 409 Conflict     │
//! │  └────────────────────────────────────────────────┘                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Reservation (status pending unless supplied)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rentline_core::pricing::{compute_price, resolve_rate};
use rentline_core::validation::{validate_agency, validate_new_reservation, validate_rental_period};
use rentline_core::{
    Clock, NewReservation, PriceBreakdown, Reservation, ReservationPatch, ValidationError,
};
use rentline_db::{Database, DbError, InsertOutcome};

use crate::config::BookingConfig;
use crate::error::{BookingError, BookingResult};

/// Reservation lifecycle manager.
///
/// Shared behind an `Arc` by every request handler.
pub struct BookingService {
    db: Arc<Database>,
    config: BookingConfig,
    clock: Arc<dyn Clock>,
    /// One async lock per vehicle id, held from conflict check to insert.
    vehicle_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl BookingService {
    pub fn new(db: Arc<Database>, config: BookingConfig, clock: Arc<dyn Clock>) -> Self {
        BookingService {
            db,
            config,
            clock,
            vehicle_locks: DashMap::new(),
        }
    }

    /// Returns the booking configuration.
    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    fn vehicle_lock(&self, vehicle_id: &str) -> Arc<Mutex<()>> {
        self.vehicle_locks
            .entry(vehicle_id.to_string())
            .or_default()
            .clone()
    }

    fn check_agency(&self, field: &str, agency: &str) -> BookingResult<()> {
        validate_agency(
            field,
            agency,
            &self.config.agencies,
            self.config.enforce_agencies,
        )?;
        Ok(())
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a reservation.
    ///
    /// When `total_price` is absent or zero the price is computed with the
    /// duration discount applied.
    pub async fn create(&self, new: NewReservation) -> BookingResult<Reservation> {
        validate_new_reservation(&new)?;

        let (Some(start), Some(end)) = (new.start_date, new.end_date) else {
            return Err(ValidationError::InvalidDateRange.into());
        };
        let vehicle_id = new.vehicle_id.clone().unwrap_or_default();

        self.check_agency("departureAgency", new.departure_agency.as_deref().unwrap_or_default())?;
        self.check_agency("returnAgency", new.return_agency.as_deref().unwrap_or_default())?;

        if let Some(price) = new.total_price {
            if price < 0 {
                return Err(ValidationError::MustBePositive {
                    field: "totalPrice".to_string(),
                }
                .into());
            }
        }

        let vehicle = self
            .db
            .vehicles()
            .get_by_id(&vehicle_id)
            .await?
            .ok_or_else(|| BookingError::VehicleNotFound {
                vehicle_id: vehicle_id.clone(),
            })?;

        let lock = self.vehicle_lock(&vehicle_id);
        let _guard = lock.lock().await;

        let total_price = match new.total_price {
            Some(price) if price != 0 => price,
            _ => compute_price(&vehicle.rate_card(), start, end, true).total,
        };

        let reservation =
            Reservation::from_new(Uuid::new_v4().to_string(), new, total_price, self.clock.now());

        match self.db.reservations().insert_checked(&reservation).await? {
            InsertOutcome::Inserted(stored) => Ok(stored),
            InsertOutcome::Conflict => {
                warn!(
                    vehicle_id = %vehicle_id,
                    start = %start,
                    end = %end,
                    "Rejected overlapping reservation"
                );
                Err(BookingError::Conflict {
                    vehicle_id,
                    start,
                    end,
                })
            }
        }
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Merges `patch` into reservation `id`.
    ///
    /// Date order and rental length are re-validated when the dates change. Overlap and price
    /// are not re-evaluated: an operator may accept an overlapping request
    /// on purpose.
    pub async fn update(&self, id: &str, patch: ReservationPatch) -> BookingResult<Reservation> {
        let mut reservation = self
            .db
            .reservations()
            .get_by_id(id)
            .await?
            .ok_or_else(|| BookingError::ReservationNotFound { id: id.to_string() })?;

        let touches_dates = patch.touches_dates();
        let new_vehicle = patch.vehicle_id.clone().filter(|v| !v.is_empty());

        if let Some(agency) = patch.departure_agency.as_deref() {
            self.check_agency("departureAgency", agency)?;
        }
        if let Some(agency) = patch.return_agency.as_deref() {
            self.check_agency("returnAgency", agency)?;
        }

        reservation.apply_patch(patch);

        if touches_dates {
            validate_rental_period(reservation.start_date, reservation.end_date)?;
        }

        if let Some(vehicle_id) = new_vehicle {
            if self.db.vehicles().get_by_id(&vehicle_id).await?.is_none() {
                return Err(BookingError::VehicleNotFound { vehicle_id });
            }
        }

        let stored = self
            .db
            .reservations()
            .update(&reservation)
            .await
            .map_err(|e| match e {
                DbError::NotFound { .. } => BookingError::ReservationNotFound { id: id.to_string() },
                other => BookingError::Store(other),
            })?;

        info!(reservation_id = %id, status = %stored.status, "Reservation updated");
        Ok(stored)
    }

    /// Deletes reservation `id`.
    pub async fn delete(&self, id: &str) -> BookingResult<()> {
        self.db.reservations().delete(id).await.map_err(|e| match e {
            DbError::NotFound { .. } => BookingError::ReservationNotFound { id: id.to_string() },
            other => BookingError::Store(other),
        })?;

        info!(reservation_id = %id, "Reservation deleted");
        Ok(())
    }

    // =========================================================================
    // Quote
    // =========================================================================

    /// Prices renting `vehicle_id` over `[start, end)`.
    ///
    /// Uses the live vehicle rate, or the configured fallback rate when
    /// the vehicle record is missing.
    pub async fn quote(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        apply_discount: bool,
    ) -> BookingResult<PriceBreakdown> {
        validate_rental_period(start, end)?;

        let vehicle = self.db.vehicles().get_by_id(vehicle_id).await?;
        if vehicle.is_none() {
            debug!(vehicle_id = %vehicle_id, "Vehicle missing, trying fallback rate");
        }

        let rate = resolve_rate(vehicle_id, vehicle.as_ref(), &self.config.fallback_rates)?;
        Ok(compute_price(&rate, start, end, apply_discount))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rentline_core::{FixedClock, NewVehicle, ReservationStatus, Vehicle};
    use rentline_db::DbConfig;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn service_with(config: BookingConfig) -> BookingService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car = Vehicle::from_new(
            "car1",
            NewVehicle {
                name: Some("Clio 5".into()),
                daily_rate: Some(35),
                image: Some("images/clio5.jpg".into()),
                location_agency: Some("Agence ANISTOUR Oran".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        db.vehicles().insert(&car).await.unwrap();

        let clock = Arc::new(FixedClock::on(date("2025-11-01")));
        BookingService::new(Arc::new(db), config, clock)
    }

    async fn service() -> BookingService {
        service_with(BookingConfig::default()).await
    }

    fn request(start: &str, end: &str) -> NewReservation {
        NewReservation {
            vehicle_id: Some("car1".into()),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
            departure_agency: Some("Agence ANISTOUR Oran".into()),
            return_agency: Some("Aéroport de Chlef".into()),
            customer_name: Some("Ahmed Alami".into()),
            customer_email: Some("ahmed.alami@example.com".into()),
            ..Default::default()
        }
    }

    fn accepted(start: &str, end: &str) -> NewReservation {
        NewReservation {
            status: Some(ReservationStatus::Accepted),
            ..request(start, end)
        }
    }

    #[tokio::test]
    async fn test_create_computes_price_when_missing() {
        let svc = service().await;

        // Mon 10 → Wed 12, two weekdays at 35
        let r = svc.create(request("2025-11-10", "2025-11-12")).await.unwrap();
        assert_eq!(r.total_price, 70);
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.customer_phone, "");
        assert!(!r.movement_applied);

        // Zero counts as "not supplied"
        let zero = NewReservation {
            total_price: Some(0),
            ..request("2025-11-20", "2025-11-21")
        };
        assert_eq!(svc.create(zero).await.unwrap().total_price, 35);
    }

    #[tokio::test]
    async fn test_create_applies_discount() {
        let svc = service().await;
        // Mon 10 → Fri 14: 4 weekdays, 140 less 10%
        let r = svc.create(request("2025-11-10", "2025-11-14")).await.unwrap();
        assert_eq!(r.total_price, 126);
    }

    #[tokio::test]
    async fn test_create_keeps_supplied_price() {
        let svc = service().await;
        let req = NewReservation {
            total_price: Some(500),
            ..request("2025-11-10", "2025-11-12")
        };
        assert_eq!(svc.create(req).await.unwrap().total_price, 500);
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let svc = service().await;

        let missing = NewReservation {
            customer_email: None,
            ..request("2025-11-10", "2025-11-12")
        };
        assert!(matches!(
            svc.create(missing).await,
            Err(BookingError::Validation(ValidationError::MissingFields { .. }))
        ));

        let inverted = request("2025-11-12", "2025-11-10");
        assert!(matches!(
            svc.create(inverted).await,
            Err(BookingError::Validation(ValidationError::InvalidDateRange))
        ));

        let negative = NewReservation {
            total_price: Some(-5),
            ..request("2025-11-10", "2025-11-12")
        };
        assert!(matches!(
            svc.create(negative).await,
            Err(BookingError::Validation(ValidationError::MustBePositive { .. }))
        ));
    }

    #[tokio::test]
    async fn test_create_unknown_vehicle() {
        let svc = service().await;
        let req = NewReservation {
            vehicle_id: Some("car99".into()),
            ..request("2025-11-10", "2025-11-12")
        };
        assert!(matches!(
            svc.create(req).await,
            Err(BookingError::VehicleNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_accepted_blocks_touching_range() {
        let svc = service().await;
        svc.create(accepted("2025-11-10", "2025-11-12")).await.unwrap();

        let err = svc.create(request("2025-11-12", "2025-11-14")).await.unwrap_err();
        assert!(matches!(err, BookingError::Conflict { .. }));
        assert_eq!(err.to_string(), "Reservation conflict");

        assert!(svc.create(request("2025-11-13", "2025-11-15")).await.is_ok());
    }

    #[tokio::test]
    async fn test_pending_does_not_block() {
        let svc = service().await;
        svc.create(request("2025-11-10", "2025-11-12")).await.unwrap();
        assert!(svc.create(request("2025-11-10", "2025-11-12")).await.is_ok());
    }

    #[tokio::test]
    async fn test_concurrent_accepted_creates_admit_one() {
        let svc = service().await;

        let (a, b) = tokio::join!(
            svc.create(accepted("2025-11-10", "2025-11-12")),
            svc.create(accepted("2025-11-11", "2025-11-13")),
        );

        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert_eq!(svc.db.reservations().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_enforced_agencies() {
        let config = BookingConfig {
            agencies: vec!["Agence ANISTOUR Oran".into()],
            enforce_agencies: true,
            ..Default::default()
        };
        let svc = service_with(config).await;

        let err = svc.create(request("2025-11-10", "2025-11-12")).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Validation(ValidationError::NotAllowed { .. })
        ));

        let ok = NewReservation {
            return_agency: Some("Agence ANISTOUR Oran".into()),
            ..request("2025-11-10", "2025-11-12")
        };
        assert!(svc.create(ok).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_and_revalidates_dates() {
        let svc = service().await;
        let r = svc.create(request("2025-11-10", "2025-11-12")).await.unwrap();

        let updated = svc
            .update(
                &r.id,
                ReservationPatch {
                    status: Some(ReservationStatus::Accepted),
                    notes: Some("baby seat".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ReservationStatus::Accepted);
        assert_eq!(updated.notes, "baby seat");
        assert_eq!(updated.total_price, 70);

        let bad_dates = ReservationPatch {
            end_date: Some(date("2025-11-09")),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(&r.id, bad_dates).await,
            Err(BookingError::Validation(ValidationError::InvalidDateRange))
        ));

        let bad_car = ReservationPatch {
            vehicle_id: Some("car99".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(&r.id, bad_car).await,
            Err(BookingError::VehicleNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let svc = service().await;
        assert!(matches!(
            svc.update("nope", ReservationPatch::default()).await,
            Err(BookingError::ReservationNotFound { .. })
        ));
        assert!(matches!(
            svc.delete("nope").await,
            Err(BookingError::ReservationNotFound { .. })
        ));

        let r = svc.create(request("2025-11-10", "2025-11-12")).await.unwrap();
        svc.delete(&r.id).await.unwrap();
        assert!(svc.db.reservations().get_by_id(&r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quote_live_and_fallback() {
        let svc = service().await;

        let live = svc
            .quote("car1", date("2025-11-15"), date("2025-11-17"), true)
            .await
            .unwrap();
        assert_eq!(live.vehicle, "Clio 5");
        assert_eq!(live.total, 84);

        // car3 is not in the store, fallback table knows it
        let fallback = svc
            .quote("car3", date("2025-11-10"), date("2025-11-11"), true)
            .await
            .unwrap();
        assert_eq!(fallback.base_rate, 120);

        assert!(matches!(
            svc.quote("car42", date("2025-11-10"), date("2025-11-11"), true).await,
            Err(BookingError::UnknownRate { .. })
        ));
        assert!(matches!(
            svc.quote("car1", date("2025-11-11"), date("2025-11-10"), true).await,
            Err(BookingError::Validation(ValidationError::InvalidDateRange))
        ));
        assert!(matches!(
            svc.quote("car1", date("2025-01-01"), date("2026-06-01"), true).await,
            Err(BookingError::Validation(ValidationError::RentalTooLong { .. }))
        ));
    }
}
