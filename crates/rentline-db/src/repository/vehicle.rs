//! # Vehicle Repository
//!
//! Database operations for the fleet.
//!
//! ## Key Operations
//! - CRUD operations
//! - Location moves (used by the relocation reconciler)
//! - Cascading delete of a vehicle's reservations

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use rentline_core::Vehicle;

const SELECT_VEHICLE: &str = r#"
    SELECT
        id, name, daily_rate, image, location_agency,
        seats, fuel_type, transmission, air_conditioning, doors, car_type,
        created_at, updated_at
    FROM vehicles
"#;

/// Repository for vehicle database operations.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: SqlitePool,
}

impl VehicleRepository {
    /// Creates a new VehicleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VehicleRepository { pool }
    }

    /// Lists every vehicle, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!("{SELECT_VEHICLE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = vehicles.len(), "Listed vehicles");
        Ok(vehicles)
    }

    /// Gets a vehicle by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Vehicle))` - Vehicle found
    /// * `Ok(None)` - Vehicle not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!("{SELECT_VEHICLE} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    /// Inserts a new vehicle.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already exists
    pub async fn insert(&self, vehicle: &Vehicle) -> DbResult<Vehicle> {
        debug!(id = %vehicle.id, name = %vehicle.name, "Inserting vehicle");

        sqlx::query(
            r#"
            INSERT INTO vehicles (
                id, name, daily_rate, image, location_agency,
                seats, fuel_type, transmission, air_conditioning, doors, car_type,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13
            )
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.name)
        .bind(vehicle.daily_rate)
        .bind(&vehicle.image)
        .bind(&vehicle.location_agency)
        .bind(vehicle.seats)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.transmission)
        .bind(vehicle.air_conditioning)
        .bind(vehicle.doors)
        .bind(&vehicle.car_type)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(vehicle.clone())
    }

    /// Writes every mutable field of `vehicle` back and bumps `updated_at`.
    ///
    /// ## Returns
    /// * `Ok(Vehicle)` - The stored row
    /// * `Err(DbError::NotFound)` - Vehicle doesn't exist
    pub async fn update(&self, vehicle: &Vehicle) -> DbResult<Vehicle> {
        debug!(id = %vehicle.id, "Updating vehicle");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE vehicles SET
                name = ?2,
                daily_rate = ?3,
                image = ?4,
                location_agency = ?5,
                seats = ?6,
                fuel_type = ?7,
                transmission = ?8,
                air_conditioning = ?9,
                doors = ?10,
                car_type = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
        )
        .bind(&vehicle.id)
        .bind(&vehicle.name)
        .bind(vehicle.daily_rate)
        .bind(&vehicle.image)
        .bind(&vehicle.location_agency)
        .bind(vehicle.seats)
        .bind(&vehicle.fuel_type)
        .bind(&vehicle.transmission)
        .bind(vehicle.air_conditioning)
        .bind(vehicle.doors)
        .bind(&vehicle.car_type)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vehicle", &vehicle.id));
        }

        let mut stored = vehicle.clone();
        stored.updated_at = now;
        Ok(stored)
    }

    /// Moves a vehicle to `agency`.
    pub async fn set_location(&self, id: &str, agency: &str) -> DbResult<()> {
        debug!(id = %id, agency = %agency, "Moving vehicle");

        let result = sqlx::query(
            "UPDATE vehicles SET location_agency = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(agency)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Vehicle", id));
        }

        Ok(())
    }

    /// Deletes a vehicle together with all of its reservations.
    ///
    /// Both deletes run in one transaction.
    ///
    /// ## Returns
    /// * `Ok(n)` - Number of reservations removed with the vehicle
    /// * `Err(DbError::NotFound)` - Vehicle doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<u64> {
        debug!(id = %id, "Deleting vehicle");

        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM reservations WHERE vehicle_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let result = sqlx::query("DELETE FROM vehicles WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Vehicle", id));
        }

        tx.commit().await?;

        info!(id = %id, reservations = removed, "Vehicle deleted");
        Ok(removed)
    }

    /// Counts vehicles (seed check, diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vehicles")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig, DbError};
    use chrono::Utc;
    use rentline_core::{NewVehicle, VehiclePatch, Vehicle};

    fn clio() -> Vehicle {
        Vehicle::from_new(
            "car1",
            NewVehicle {
                name: Some("Clio 5".into()),
                daily_rate: Some(35),
                image: Some("images/clio5.jpg".into()),
                location_agency: Some("Agence ANISTOUR Oran".into()),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_get_list() {
        let db = db().await;
        let repo = db.vehicles();

        repo.insert(&clio()).await.unwrap();

        let stored = repo.get_by_id("car1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Clio 5");
        assert_eq!(stored.daily_rate, 35);
        assert!(stored.air_conditioning);
        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert!(repo.get_by_id("car2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let db = db().await;
        db.vehicles().insert(&clio()).await.unwrap();
        let err = db.vehicles().insert(&clio()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_and_missing() {
        let db = db().await;
        let repo = db.vehicles();
        let mut car = repo.insert(&clio()).await.unwrap();

        car.apply_patch(VehiclePatch {
            daily_rate: Some(40),
            ..Default::default()
        });
        repo.update(&car).await.unwrap();
        assert_eq!(repo.get_by_id("car1").await.unwrap().unwrap().daily_rate, 40);

        let mut ghost = clio();
        ghost.id = "car404".into();
        assert!(repo.update(&ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_set_location() {
        let db = db().await;
        let repo = db.vehicles();
        repo.insert(&clio()).await.unwrap();

        repo.set_location("car1", "Aéroport de Chlef").await.unwrap();
        let car = repo.get_by_id("car1").await.unwrap().unwrap();
        assert_eq!(car.location_agency, "Aéroport de Chlef");

        assert!(repo.set_location("nope", "x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_vehicle() {
        let db = db().await;
        assert!(db.vehicles().delete("car404").await.unwrap_err().is_not_found());
        assert_eq!(db.vehicles().count().await.unwrap(), 0);
    }
}
