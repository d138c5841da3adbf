//! # Reservation Repository
//!
//! Database operations for reservations.
//!
//! ## Conflict-Checked Insert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT start_date, end_date FROM reservations                        │
//! │      WHERE vehicle_id = ? AND status = 'accepted'                       │
//! │    has_conflict(candidate, existing)?                                   │
//! │      ├── yes → ROLLBACK, InsertOutcome::Conflict                        │
//! │      └── no  → INSERT, COMMIT, InsertOutcome::Inserted                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The booking service also serializes creates per vehicle, so two
//! requests for the same car never interleave between the check and
//! the insert.
//!
//! ## Relocation
//! `apply_relocation` flips `movement_applied` with a guarded UPDATE
//! (`WHERE movement_applied = 0`) and moves the vehicle in the same
//! transaction. A second call for the same reservation is a no-op.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use rentline_core::availability::{has_conflict, DateRange};
use rentline_core::{Reservation, ReservationStatus};

const SELECT_RESERVATION: &str = r#"
    SELECT
        id, vehicle_id, start_date, end_date,
        departure_agency, return_agency,
        customer_name, customer_email, customer_phone,
        total_price, notes, documents, status,
        payment_method, payment_status,
        paypal_transaction_id, paypal_screenshot,
        stripe_payment_intent_id, bank_transfer_receipt, payment_notes,
        movement_applied, created_at, updated_at
    FROM reservations
"#;

/// Result of [`ReservationRepository::insert_checked`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The reservation was stored.
    Inserted(Reservation),
    /// An accepted reservation of the same vehicle overlaps the dates.
    Conflict,
}

/// Result of [`ReservationRepository::apply_relocation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Flag set and vehicle moved to the return agency.
    Moved { vehicle_id: String, to: String },
    /// Flag set; the vehicle was already at the return agency.
    AlreadyThere { vehicle_id: String },
    /// Flag was already set. Nothing changed.
    AlreadyApplied,
    /// The reservation no longer exists. Nothing changed.
    Vanished,
}

/// Repository for reservation database operations.
#[derive(Debug, Clone)]
pub struct ReservationRepository {
    pool: SqlitePool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReservationRepository { pool }
    }

    /// Lists reservations, optionally for a single vehicle.
    ///
    /// Ordered by start date, then id.
    pub async fn list(&self, vehicle_id: Option<&str>) -> DbResult<Vec<Reservation>> {
        let reservations = match vehicle_id {
            Some(vehicle_id) => {
                sqlx::query_as::<_, Reservation>(&format!(
                    "{SELECT_RESERVATION} WHERE vehicle_id = ?1 ORDER BY start_date, id"
                ))
                .bind(vehicle_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Reservation>(&format!(
                    "{SELECT_RESERVATION} ORDER BY start_date, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        debug!(count = reservations.len(), "Listed reservations");
        Ok(reservations)
    }

    /// Gets a reservation by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reservation>> {
        let reservation =
            sqlx::query_as::<_, Reservation>(&format!("{SELECT_RESERVATION} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(reservation)
    }

    /// Lists accepted reservations of a vehicle (the availability blockers).
    pub async fn list_accepted(&self, vehicle_id: &str) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "{SELECT_RESERVATION} WHERE vehicle_id = ?1 AND status = ?2 ORDER BY start_date"
        ))
        .bind(vehicle_id)
        .bind(ReservationStatus::Accepted)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Inserts a reservation without any availability check.
    ///
    /// Used by seeding; request paths go through [`Self::insert_checked`].
    pub async fn insert(&self, reservation: &Reservation) -> DbResult<Reservation> {
        debug!(id = %reservation.id, vehicle_id = %reservation.vehicle_id, "Inserting reservation");

        let mut conn = self.pool.acquire().await?;
        insert_row(&mut *conn, reservation).await?;

        Ok(reservation.clone())
    }

    /// Inserts a reservation unless an accepted reservation of the same
    /// vehicle overlaps it. Check and insert share one transaction.
    pub async fn insert_checked(&self, reservation: &Reservation) -> DbResult<InsertOutcome> {
        let mut tx = self.pool.begin().await?;

        let existing: Vec<(NaiveDate, NaiveDate)> = sqlx::query_as(
            "SELECT start_date, end_date FROM reservations WHERE vehicle_id = ?1 AND status = ?2",
        )
        .bind(&reservation.vehicle_id)
        .bind(ReservationStatus::Accepted)
        .fetch_all(&mut *tx)
        .await?;

        let existing: Vec<DateRange> = existing
            .into_iter()
            .map(|(start, end)| DateRange::new(start, end))
            .collect();

        if has_conflict(&DateRange::from(reservation), &existing) {
            debug!(
                vehicle_id = %reservation.vehicle_id,
                start = %reservation.start_date,
                end = %reservation.end_date,
                "Reservation conflicts with an accepted booking"
            );
            tx.rollback().await?;
            return Ok(InsertOutcome::Conflict);
        }

        insert_row(&mut *tx, reservation).await?;
        tx.commit().await?;

        info!(
            id = %reservation.id,
            vehicle_id = %reservation.vehicle_id,
            status = %reservation.status,
            "Reservation created"
        );
        Ok(InsertOutcome::Inserted(reservation.clone()))
    }

    /// Writes every mutable field of `reservation` back and bumps `updated_at`.
    ///
    /// `movement_applied` is not touched; only [`Self::apply_relocation`]
    /// changes it.
    pub async fn update(&self, reservation: &Reservation) -> DbResult<Reservation> {
        debug!(id = %reservation.id, "Updating reservation");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE reservations SET
                vehicle_id = ?2,
                start_date = ?3,
                end_date = ?4,
                departure_agency = ?5,
                return_agency = ?6,
                customer_name = ?7,
                customer_email = ?8,
                customer_phone = ?9,
                total_price = ?10,
                notes = ?11,
                documents = ?12,
                status = ?13,
                payment_method = ?14,
                payment_status = ?15,
                paypal_transaction_id = ?16,
                paypal_screenshot = ?17,
                stripe_payment_intent_id = ?18,
                bank_transfer_receipt = ?19,
                payment_notes = ?20,
                updated_at = ?21
            WHERE id = ?1
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.vehicle_id)
        .bind(reservation.start_date)
        .bind(reservation.end_date)
        .bind(&reservation.departure_agency)
        .bind(&reservation.return_agency)
        .bind(&reservation.customer_name)
        .bind(&reservation.customer_email)
        .bind(&reservation.customer_phone)
        .bind(reservation.total_price)
        .bind(&reservation.notes)
        .bind(&reservation.documents)
        .bind(reservation.status)
        .bind(reservation.payment_method)
        .bind(reservation.payment_status)
        .bind(&reservation.paypal_transaction_id)
        .bind(&reservation.paypal_screenshot)
        .bind(&reservation.stripe_payment_intent_id)
        .bind(&reservation.bank_transfer_receipt)
        .bind(&reservation.payment_notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", &reservation.id));
        }

        let mut stored = reservation.clone();
        stored.updated_at = now;
        Ok(stored)
    }

    /// Deletes a reservation.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting reservation");

        let result = sqlx::query("DELETE FROM reservations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reservation", id));
        }

        Ok(())
    }

    /// Lists accepted reservations whose return day is on or before `today`
    /// and whose relocation has not been applied.
    ///
    /// Ordered by end date ascending (then id), so when a vehicle has
    /// several pending returns the latest one is applied last.
    pub async fn list_pending_relocation(&self, today: NaiveDate) -> DbResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            r#"{SELECT_RESERVATION}
            WHERE movement_applied = 0
              AND status = ?1
              AND end_date <= ?2
            ORDER BY end_date, id"#
        ))
        .bind(ReservationStatus::Accepted)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    /// Marks the relocation of reservation `id` as applied and moves its
    /// vehicle to the return agency. Idempotent.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - The reservation's vehicle doesn't exist
    pub async fn apply_relocation(&self, id: &str) -> DbResult<RelocationOutcome> {
        let mut tx = self.pool.begin().await?;

        let flagged = sqlx::query(
            "UPDATE reservations SET movement_applied = 1, updated_at = ?2 \
             WHERE id = ?1 AND movement_applied = 0",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if flagged == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM reservations WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
            tx.rollback().await?;

            return match exists {
                Some(_) => Ok(RelocationOutcome::AlreadyApplied),
                None => Ok(RelocationOutcome::Vanished),
            };
        }

        let (vehicle_id, return_agency): (String, String) =
            sqlx::query_as("SELECT vehicle_id, return_agency FROM reservations WHERE id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT location_agency FROM vehicles WHERE id = ?1")
                .bind(&vehicle_id)
                .fetch_optional(&mut *tx)
                .await?;

        let outcome = match current {
            None => {
                tx.rollback().await?;
                return Err(DbError::not_found("Vehicle", vehicle_id));
            }
            Some(location) if location == return_agency => {
                RelocationOutcome::AlreadyThere { vehicle_id }
            }
            Some(_) => {
                sqlx::query(
                    "UPDATE vehicles SET location_agency = ?2, updated_at = ?3 WHERE id = ?1",
                )
                .bind(&vehicle_id)
                .bind(&return_agency)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;

                RelocationOutcome::Moved {
                    vehicle_id,
                    to: return_agency,
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Counts reservations of a vehicle.
    pub async fn count_for_vehicle(&self, vehicle_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE vehicle_id = ?1")
            .bind(vehicle_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts all reservations.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_row(conn: &mut sqlx::SqliteConnection, r: &Reservation) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO reservations (
            id, vehicle_id, start_date, end_date,
            departure_agency, return_agency,
            customer_name, customer_email, customer_phone,
            total_price, notes, documents, status,
            payment_method, payment_status,
            paypal_transaction_id, paypal_screenshot,
            stripe_payment_intent_id, bank_transfer_receipt, payment_notes,
            movement_applied, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6,
            ?7, ?8, ?9,
            ?10, ?11, ?12, ?13,
            ?14, ?15,
            ?16, ?17,
            ?18, ?19, ?20,
            ?21, ?22, ?23
        )
        "#,
    )
    .bind(&r.id)
    .bind(&r.vehicle_id)
    .bind(r.start_date)
    .bind(r.end_date)
    .bind(&r.departure_agency)
    .bind(&r.return_agency)
    .bind(&r.customer_name)
    .bind(&r.customer_email)
    .bind(&r.customer_phone)
    .bind(r.total_price)
    .bind(&r.notes)
    .bind(&r.documents)
    .bind(r.status)
    .bind(r.payment_method)
    .bind(r.payment_status)
    .bind(&r.paypal_transaction_id)
    .bind(&r.paypal_screenshot)
    .bind(&r.stripe_payment_intent_id)
    .bind(&r.bank_transfer_receipt)
    .bind(&r.payment_notes)
    .bind(r.movement_applied)
    .bind(r.created_at)
    .bind(r.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rentline_core::{NewReservation, NewVehicle, Vehicle};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn db_with_car() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car = Vehicle::from_new(
            "car1",
            NewVehicle {
                name: Some("Clio 5".into()),
                daily_rate: Some(35),
                image: Some("images/clio5.jpg".into()),
                location_agency: Some("Aéroport Tlemcen".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        db.vehicles().insert(&car).await.unwrap();
        db
    }

    fn booking(id: &str, start: &str, end: &str, status: ReservationStatus) -> Reservation {
        let new = NewReservation {
            vehicle_id: Some("car1".into()),
            start_date: Some(date(start)),
            end_date: Some(date(end)),
            departure_agency: Some("Aéroport Tlemcen".into()),
            return_agency: Some("Agence Tlemcen".into()),
            customer_name: Some("Ahmed Alami".into()),
            customer_email: Some("ahmed.alami@example.com".into()),
            status: Some(status),
            ..Default::default()
        };
        Reservation::from_new(id, new, 70, Utc::now())
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let db = db_with_car().await;
        let mut r = booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Pending);
        r.documents = Some(r#"{"cin":"cin.jpg"}"#.into());
        r.payment_method = Some(rentline_core::PaymentMethod::BankTransfer);

        db.reservations().insert(&r).await.unwrap();
        let stored = db.reservations().get_by_id("r1").await.unwrap().unwrap();

        assert_eq!(stored.start_date, date("2025-11-10"));
        assert_eq!(stored.documents, r.documents);
        assert_eq!(stored.payment_method, r.payment_method);
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert!(!stored.movement_applied);
    }

    #[tokio::test]
    async fn test_insert_checked_rejects_overlap_with_accepted() {
        let db = db_with_car().await;
        let repo = db.reservations();

        let first = booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Accepted);
        assert!(matches!(
            repo.insert_checked(&first).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));

        // Starts on the day r1 is returned
        let touching = booking("r2", "2025-11-12", "2025-11-14", ReservationStatus::Pending);
        assert_eq!(repo.insert_checked(&touching).await.unwrap(), InsertOutcome::Conflict);
        assert_eq!(repo.count().await.unwrap(), 1);

        let later = booking("r3", "2025-11-13", "2025-11-15", ReservationStatus::Pending);
        assert!(matches!(
            repo.insert_checked(&later).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));
    }

    #[tokio::test]
    async fn test_pending_and_refused_do_not_block() {
        let db = db_with_car().await;
        let repo = db.reservations();

        repo.insert(&booking("p", "2025-11-10", "2025-11-12", ReservationStatus::Pending))
            .await
            .unwrap();
        repo.insert(&booking("x", "2025-11-10", "2025-11-12", ReservationStatus::Refused))
            .await
            .unwrap();

        let candidate = booking("c", "2025-11-10", "2025-11-12", ReservationStatus::Pending);
        assert!(matches!(
            repo.insert_checked(&candidate).await.unwrap(),
            InsertOutcome::Inserted(_)
        ));
        assert!(repo.list_accepted("car1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_vehicle() {
        let db = db_with_car().await;
        let repo = db.reservations();
        repo.insert(&booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Pending))
            .await
            .unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 1);
        assert_eq!(repo.list(Some("car1")).await.unwrap().len(), 1);
        assert!(repo.list(Some("car2")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = db_with_car().await;
        let repo = db.reservations();
        let mut r = repo
            .insert(&booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Pending))
            .await
            .unwrap();

        r.status = ReservationStatus::Accepted;
        repo.update(&r).await.unwrap();
        assert_eq!(repo.list_accepted("car1").await.unwrap().len(), 1);

        repo.delete("r1").await.unwrap();
        assert!(repo.delete("r1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_range_hits_check_constraint() {
        let db = db_with_car().await;
        let r = booking("r1", "2025-11-12", "2025-11-12", ReservationStatus::Pending);
        let err = db.reservations().insert(&r).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_vehicle_delete_cascades() {
        let db = db_with_car().await;
        let repo = db.reservations();
        repo.insert(&booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Accepted))
            .await
            .unwrap();
        repo.insert(&booking("r2", "2025-11-20", "2025-11-22", ReservationStatus::Pending))
            .await
            .unwrap();

        let removed = db.vehicles().delete("car1").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.count_for_vehicle("car1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pending_relocation_selection() {
        let db = db_with_car().await;
        let repo = db.reservations();
        repo.insert(&booking("past", "2025-11-10", "2025-11-12", ReservationStatus::Accepted))
            .await
            .unwrap();
        repo.insert(&booking("future", "2025-11-20", "2025-11-22", ReservationStatus::Accepted))
            .await
            .unwrap();
        repo.insert(&booking("pending", "2025-11-01", "2025-11-03", ReservationStatus::Pending))
            .await
            .unwrap();

        let due = repo.list_pending_relocation(date("2025-11-12")).await.unwrap();
        let ids: Vec<_> = due.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["past"]);
    }

    #[tokio::test]
    async fn test_apply_relocation_is_idempotent() {
        let db = db_with_car().await;
        let repo = db.reservations();
        repo.insert(&booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Accepted))
            .await
            .unwrap();

        let first = repo.apply_relocation("r1").await.unwrap();
        assert_eq!(
            first,
            RelocationOutcome::Moved {
                vehicle_id: "car1".into(),
                to: "Agence Tlemcen".into()
            }
        );
        let car = db.vehicles().get_by_id("car1").await.unwrap().unwrap();
        assert_eq!(car.location_agency, "Agence Tlemcen");

        assert_eq!(
            repo.apply_relocation("r1").await.unwrap(),
            RelocationOutcome::AlreadyApplied
        );
        assert!(repo.get_by_id("r1").await.unwrap().unwrap().movement_applied);
        assert_eq!(
            repo.apply_relocation("ghost").await.unwrap(),
            RelocationOutcome::Vanished
        );
    }

    #[tokio::test]
    async fn test_relocation_to_current_location_only_flags() {
        let db = db_with_car().await;
        let mut r = booking("r1", "2025-11-10", "2025-11-12", ReservationStatus::Accepted);
        r.return_agency = "Aéroport Tlemcen".into();
        db.reservations().insert(&r).await.unwrap();

        assert_eq!(
            db.reservations().apply_relocation("r1").await.unwrap(),
            RelocationOutcome::AlreadyThere {
                vehicle_id: "car1".into()
            }
        );
    }
}
