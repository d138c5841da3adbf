//! # Demo Fleet Seeding
//!
//! Populates an empty database with the five-car demo fleet, ten accepted
//! bookings spread over November/December 2025 and the default contact
//! settings.
//!
//! ```text
//! seed_if_empty
//!   ├── vehicles.count() > 0 ?  → SeedReport { seeded: false }
//!   └── else
//!         ├── 5 vehicles   (car1..car5)
//!         ├── 10 reservations, status accepted
//!         └── 5 settings   (insert-if-absent)
//! ```

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use rentline_core::{
    NewReservation, NewVehicle, Reservation, ReservationStatus, SettingType, Vehicle,
};

/// What a seeding pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub seeded: bool,
    pub vehicles: usize,
    pub reservations: usize,
    pub settings: usize,
}

/// `(id, name, daily rate, image, location)`
const FLEET: [(&str, &str, i64, &str, &str); 5] = [
    ("car1", "Clio 5", 35, "images/clio5.jpg", "Aéroport Tlemcen - Messali El Hadj"),
    ("car2", "Audi A4", 85, "images/audia4.jpg", "Aéroport d'Oran - Ahmed Ben Bella"),
    ("car3", "Mercedes CLA 220", 120, "images/Mercedes CLA 220.jpg", "Agence ANISTOUR Oran"),
    ("car4", "Dacia Logan", 45, "images/Dacia Logan.jpg", "Agence ANISTOUR Tlemcen"),
    ("car5", "Peugeot 308", 65, "images/Peugeot 308.jpg", "Aéroport de Chlef"),
];

/// `(vehicle, start, end, agency, customer, email, phone)`
const BOOKINGS: [(&str, &str, &str, &str, &str, &str, &str); 10] = [
    ("car1", "2025-11-10", "2025-11-12", "Aéroport Tlemcen", "Ahmed Alami", "ahmed.alami@example.com", "+212 6 12 34 56 78"),
    ("car1", "2025-11-20", "2025-11-22", "Aéroport Tlemcen", "Yasmine Benjelloun", "yasmine.b@example.com", "+212 6 23 45 67 89"),
    ("car2", "2025-11-13", "2025-11-16", "Aéroport d'Oran", "Karim Tazi", "karim.tazi@example.com", "+212 6 34 56 78 90"),
    ("car2", "2025-12-01", "2025-12-03", "Aéroport d'Oran", "Leila Fassi", "leila.fassi@example.com", "+212 6 45 67 89 01"),
    ("car3", "2025-11-15", "2025-11-18", "Agence ANISTOUR Oran", "Omar Bennani", "omar.bennani@example.com", "+212 6 56 78 90 12"),
    ("car3", "2025-11-25", "2025-11-28", "Agence ANISTOUR Oran", "Salma Chraibi", "salma.chraibi@example.com", "+212 6 67 89 01 23"),
    ("car4", "2025-11-08", "2025-11-10", "Agence ANISTOUR Tlemcen", "Hassan Idrissi", "hassan.idrissi@example.com", "+212 6 78 90 12 34"),
    ("car4", "2025-11-18", "2025-11-20", "Agence ANISTOUR Tlemcen", "Nadia Lahlou", "nadia.lahlou@example.com", "+212 6 89 01 23 45"),
    ("car5", "2025-11-12", "2025-11-15", "Aéroport de Chlef", "Youssef Kadiri", "youssef.kadiri@example.com", "+212 6 90 12 34 56"),
    ("car5", "2025-11-22", "2025-11-25", "Aéroport de Chlef", "Fatima Zahra", "fatima.zahra@example.com", "+212 6 01 23 45 67"),
];

/// `(key, value, description)`
const DEFAULT_SETTINGS: [(&str, &str, &str); 5] = [
    ("contact_phone", "+213 771 39 14 80", "Contact phone number"),
    ("contact_email", "contact@fandiauto.com", "Contact email address"),
    ("contact_address", "Tlemcen, Algérie", "Physical address"),
    ("company_name", "FANDIAUTO", "Company name"),
    ("whatsapp_number", "213771391480", "WhatsApp contact number"),
];

fn parse_date(s: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DbError::Internal(format!("bad seed date {s}: {e}")))
}

/// Seeds the demo data when the fleet is empty. No-op otherwise.
///
/// Seeded bookings are billed at `rate × days` without weekend surcharge
/// or discount.
pub async fn seed_if_empty(db: &Database) -> DbResult<SeedReport> {
    let existing = db.vehicles().count().await?;
    if existing > 0 {
        info!(vehicles = existing, "Fleet already present, skipping seed");
        return Ok(SeedReport::default());
    }

    let now = Utc::now();
    let mut report = SeedReport {
        seeded: true,
        ..Default::default()
    };

    for (id, name, rate, image, location) in FLEET {
        let vehicle = Vehicle::from_new(
            id,
            NewVehicle {
                name: Some(name.to_string()),
                daily_rate: Some(rate),
                image: Some(image.to_string()),
                location_agency: Some(location.to_string()),
                ..Default::default()
            },
            now,
        );
        db.vehicles().insert(&vehicle).await?;
        report.vehicles += 1;
    }

    for (vehicle_id, start, end, agency, name, email, phone) in BOOKINGS {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let rate = FLEET
            .iter()
            .find(|(id, ..)| *id == vehicle_id)
            .map(|(_, _, rate, ..)| *rate)
            .unwrap_or_default();

        let new = NewReservation {
            vehicle_id: Some(vehicle_id.to_string()),
            start_date: Some(start),
            end_date: Some(end),
            departure_agency: Some(agency.to_string()),
            return_agency: Some(agency.to_string()),
            customer_name: Some(name.to_string()),
            customer_email: Some(email.to_string()),
            customer_phone: Some(phone.to_string()),
            status: Some(ReservationStatus::Accepted),
            ..Default::default()
        };
        let total = rate * (end - start).num_days();
        let reservation = Reservation::from_new(Uuid::new_v4().to_string(), new, total, now);

        db.reservations().insert(&reservation).await?;
        report.reservations += 1;
    }

    for (key, value, description) in DEFAULT_SETTINGS {
        if db
            .settings()
            .insert_if_absent(key, value, SettingType::String, Some(description))
            .await?
        {
            report.settings += 1;
        }
    }

    info!(
        vehicles = report.vehicles,
        reservations = report.reservations,
        settings = report.settings,
        "Demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;

    #[tokio::test]
    async fn test_seed_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let report = seed_if_empty(&db).await.unwrap();
        assert!(report.seeded);
        assert_eq!(report.vehicles, 5);
        assert_eq!(report.reservations, 10);
        assert_eq!(report.settings, 5);

        let again = seed_if_empty(&db).await.unwrap();
        assert!(!again.seeded);
        assert_eq!(db.vehicles().count().await.unwrap(), 5);
        assert_eq!(db.reservations().count().await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_seeded_bookings_are_accepted_and_priced() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_if_empty(&db).await.unwrap();

        let clio = db.reservations().list_accepted("car1").await.unwrap();
        assert_eq!(clio.len(), 2);
        assert!(clio.iter().all(|r| r.total_price == 70));

        let phone = db.settings().get("contact_phone").await.unwrap().unwrap();
        assert_eq!(phone.value, "+213 771 39 14 80");
    }
}
