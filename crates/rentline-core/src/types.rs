//! # Domain Types
//!
//! Core domain types used throughout Rentline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │    Vehicle      │   │    Reservation      │   │    Setting      │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id ("car1")    │◄──│  vehicle_id (FK)    │   │  key (PK)       │   │
//! │  │  name           │   │  start/end date     │   │  value (text)   │   │
//! │  │  daily_rate     │   │  status             │   │  type           │   │
//! │  │  location       │   │  movement_applied   │   └─────────────────┘   │
//! │  └─────────────────┘   └─────────────────────┘                          │
//! │                                                                         │
//! │  ┌───────────────────┐  ┌─────────────────┐  ┌──────────────────────┐  │
//! │  │ ReservationStatus │  │ PaymentMethod   │  │  PaymentSettings     │  │
//! │  │  Pending          │  │  Stripe         │  │  (singleton row)     │  │
//! │  │  Accepted ◄ blocks│  │  Paypal         │  │  bank / stripe /     │  │
//! │  │  Refused          │  │  BankTransfer   │  │  paypal toggles      │  │
//! │  └───────────────────┘  └─────────────────┘  └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Structs serialize as camelCase JSON because the booking front-end
//! already speaks that shape (`carId`, `startDate`, `locationAgency`).
//! Daily rates and reservation totals are whole currency units.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::RateCard;

// =============================================================================
// Vehicle
// =============================================================================

/// A rentable vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Business identifier (e.g. `car1`, `car1731571200000`).
    pub id: String,

    /// Display name shown to customers.
    pub name: String,

    /// Daily base rate in whole currency units.
    #[serde(rename = "price")]
    pub daily_rate: i64,

    /// Image path or URL.
    pub image: Option<String>,

    /// Agency where the vehicle currently is.
    pub location_agency: String,

    pub seats: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub air_conditioning: bool,
    pub doors: i64,
    pub car_type: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Returns the daily rate as Money.
    #[inline]
    pub fn daily_rate(&self) -> Money {
        Money::from_units(self.daily_rate)
    }

    /// Builds the rate card the pricing engine consumes.
    pub fn rate_card(&self) -> RateCard {
        RateCard::new(self.id.clone(), self.name.clone(), self.daily_rate)
    }

    /// Builds a vehicle from a validated draft.
    ///
    /// Optional descriptive attributes fall back to the fleet defaults
    /// (5 seats, petrol, automatic, air conditioning, 5 doors, sedan).
    pub fn from_new(id: impl Into<String>, new: NewVehicle, now: DateTime<Utc>) -> Self {
        Vehicle {
            id: id.into(),
            name: new.name.unwrap_or_default().trim().to_string(),
            daily_rate: new.daily_rate.unwrap_or_default(),
            image: new.image,
            location_agency: new.location_agency.unwrap_or_default(),
            seats: new.seats.unwrap_or(DEFAULT_SEATS),
            fuel_type: new.fuel_type.unwrap_or_else(|| DEFAULT_FUEL_TYPE.to_string()),
            transmission: new
                .transmission
                .unwrap_or_else(|| DEFAULT_TRANSMISSION.to_string()),
            air_conditioning: new.air_conditioning != Some(false),
            doors: new.doors.unwrap_or(DEFAULT_DOORS),
            car_type: new.car_type.unwrap_or_else(|| DEFAULT_CAR_TYPE.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields of a patch. Absent fields are untouched.
    pub fn apply_patch(&mut self, patch: VehiclePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(rate) = patch.daily_rate {
            self.daily_rate = rate;
        }
        if let Some(image) = patch.image {
            self.image = Some(image);
        }
        if let Some(location) = patch.location_agency {
            self.location_agency = location;
        }
        if let Some(seats) = patch.seats {
            self.seats = seats;
        }
        if let Some(fuel_type) = patch.fuel_type {
            self.fuel_type = fuel_type;
        }
        if let Some(transmission) = patch.transmission {
            self.transmission = transmission;
        }
        if let Some(ac) = patch.air_conditioning {
            self.air_conditioning = ac;
        }
        if let Some(doors) = patch.doors {
            self.doors = doors;
        }
        if let Some(car_type) = patch.car_type {
            self.car_type = car_type;
        }
    }
}

pub const DEFAULT_SEATS: i64 = 5;
pub const DEFAULT_DOORS: i64 = 5;
pub const DEFAULT_FUEL_TYPE: &str = "Essence SP";
pub const DEFAULT_TRANSMISSION: &str = "Automatique";
pub const DEFAULT_CAR_TYPE: &str = "Berline";

/// Input for creating a vehicle. Required fields are optional here so
/// that validation can report them by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    pub name: Option<String>,
    #[serde(rename = "price")]
    pub daily_rate: Option<i64>,
    pub image: Option<String>,
    pub location_agency: Option<String>,
    pub seats: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub air_conditioning: Option<bool>,
    pub doors: Option<i64>,
    pub car_type: Option<String>,
}

/// Partial vehicle update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    pub name: Option<String>,
    #[serde(rename = "price")]
    pub daily_rate: Option<i64>,
    pub image: Option<String>,
    pub location_agency: Option<String>,
    pub seats: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub air_conditioning: Option<bool>,
    pub doors: Option<i64>,
    pub car_type: Option<String>,
}

// =============================================================================
// Reservation Status
// =============================================================================

/// Operator decision on a reservation.
///
/// ## Transitions
/// ```text
///            ┌──────────► Accepted ──┐
///  Pending ──┤                       │  (any status may be set to any
///            └──────────► Refused ◄──┘   other by an operator update)
/// ```
///
/// Only `Accepted` reservations block the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Submitted, waiting for an operator.
    #[default]
    Pending,
    /// Confirmed by an operator.
    Accepted,
    /// Declined by an operator.
    Refused,
}

impl ReservationStatus {
    /// Returns true if reservations in this status take the vehicle off
    /// the market for their dates.
    #[inline]
    pub const fn blocks_availability(&self) -> bool {
        matches!(self, ReservationStatus::Accepted)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Refused => "refused",
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method / Status
// =============================================================================

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Card payment through Stripe.
    Stripe,
    /// PayPal transfer, confirmed with a transaction id or screenshot.
    Paypal,
    /// Bank transfer, confirmed with a receipt.
    BankTransfer,
}

/// Where the payment stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

// =============================================================================
// Reservation
// =============================================================================

/// A booking of one vehicle over a date range.
///
/// ## Date Semantics
/// `start_date` is the pickup day and `end_date` the return day. Billing
/// covers `[start_date, end_date)`, so a Friday to Sunday rental is two
/// billed days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// UUID v4, generated at creation.
    pub id: String,

    /// Vehicle being rented.
    #[serde(rename = "carId")]
    pub vehicle_id: String,

    #[ts(as = "String")]
    pub start_date: NaiveDate,

    #[ts(as = "String")]
    pub end_date: NaiveDate,

    pub departure_agency: String,
    pub return_agency: String,

    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,

    /// Amount owed in whole currency units.
    pub total_price: i64,

    pub notes: String,

    /// Opaque attachment payload (JSON text as sent by the client).
    pub documents: Option<String>,

    pub status: ReservationStatus,

    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub paypal_transaction_id: Option<String>,
    pub paypal_screenshot: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub bank_transfer_receipt: Option<String>,
    pub payment_notes: Option<String>,

    /// Set once the vehicle has been moved to `return_agency` after the
    /// return date. Never reset.
    pub movement_applied: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Returns true if this reservation is a conflict source for new bookings.
    #[inline]
    pub fn blocks_availability(&self) -> bool {
        self.status.blocks_availability()
    }

    /// Returns true if the vehicle relocation is due on `today`.
    pub fn relocation_due(&self, today: NaiveDate) -> bool {
        self.status == ReservationStatus::Accepted
            && !self.movement_applied
            && self.end_date <= today
    }

    /// Builds a reservation from a validated request.
    ///
    /// `total_price` is the final amount (caller-supplied or computed).
    pub fn from_new(
        id: impl Into<String>,
        new: NewReservation,
        total_price: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Reservation {
            id: id.into(),
            vehicle_id: new.vehicle_id.unwrap_or_default(),
            start_date: new.start_date.unwrap_or_default(),
            end_date: new.end_date.unwrap_or_default(),
            departure_agency: new.departure_agency.unwrap_or_default(),
            return_agency: new.return_agency.unwrap_or_default(),
            customer_name: new.customer_name.unwrap_or_default(),
            customer_email: new.customer_email.unwrap_or_default(),
            customer_phone: new.customer_phone.unwrap_or_default(),
            total_price,
            notes: new.notes.unwrap_or_default(),
            documents: new.documents,
            status: new.status.unwrap_or_default(),
            payment_method: new.payment_method,
            payment_status: new.payment_status.unwrap_or_default(),
            paypal_transaction_id: new.paypal_transaction_id,
            paypal_screenshot: new.paypal_screenshot,
            stripe_payment_intent_id: new.stripe_payment_intent_id,
            bank_transfer_receipt: new.bank_transfer_receipt,
            payment_notes: new.payment_notes,
            movement_applied: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields of a patch. Absent fields are untouched.
    ///
    /// Dates, vehicle, price and status are taken as given; overlap and
    /// price are not re-evaluated here.
    pub fn apply_patch(&mut self, patch: ReservationPatch) {
        if let Some(v) = patch.vehicle_id.filter(|v| !v.is_empty()) {
            self.vehicle_id = v;
        }
        if let Some(v) = patch.start_date {
            self.start_date = v;
        }
        if let Some(v) = patch.end_date {
            self.end_date = v;
        }
        if let Some(v) = patch.customer_name.filter(|v| !v.is_empty()) {
            self.customer_name = v;
        }
        if let Some(v) = patch.customer_email.filter(|v| !v.is_empty()) {
            self.customer_email = v;
        }
        if let Some(v) = patch.customer_phone {
            self.customer_phone = v;
        }
        if let Some(v) = patch.total_price {
            self.total_price = v;
        }
        if let Some(v) = patch.notes {
            self.notes = v;
        }
        if let Some(v) = patch.documents {
            self.documents = Some(v);
        }
        if let Some(v) = patch.departure_agency {
            self.departure_agency = v;
        }
        if let Some(v) = patch.return_agency {
            self.return_agency = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.payment_method {
            self.payment_method = Some(v);
        }
        if let Some(v) = patch.payment_status {
            self.payment_status = v;
        }
        if let Some(v) = patch.paypal_transaction_id {
            self.paypal_transaction_id = Some(v);
        }
        if let Some(v) = patch.paypal_screenshot {
            self.paypal_screenshot = Some(v);
        }
        if let Some(v) = patch.stripe_payment_intent_id {
            self.stripe_payment_intent_id = Some(v);
        }
        if let Some(v) = patch.bank_transfer_receipt {
            self.bank_transfer_receipt = Some(v);
        }
        if let Some(v) = patch.payment_notes {
            self.payment_notes = Some(v);
        }
    }
}

/// Input for creating a reservation.
///
/// Every field is optional at the type level; `validate_new_reservation`
/// decides which ones are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    #[serde(rename = "carId")]
    pub vehicle_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    pub departure_agency: Option<String>,
    pub return_agency: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// When absent or zero the price is computed.
    pub total_price: Option<i64>,
    pub notes: Option<String>,
    pub documents: Option<String>,
    pub status: Option<ReservationStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub paypal_transaction_id: Option<String>,
    pub paypal_screenshot: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub bank_transfer_receipt: Option<String>,
    pub payment_notes: Option<String>,
}

/// Partial reservation update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPatch {
    #[serde(rename = "carId")]
    pub vehicle_id: Option<String>,
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
    pub departure_agency: Option<String>,
    pub return_agency: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub total_price: Option<i64>,
    pub notes: Option<String>,
    pub documents: Option<String>,
    pub status: Option<ReservationStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub paypal_transaction_id: Option<String>,
    pub paypal_screenshot: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub bank_transfer_receipt: Option<String>,
    pub payment_notes: Option<String>,
}

impl ReservationPatch {
    /// Returns true if the patch moves the booking in time.
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

// =============================================================================
// Settings
// =============================================================================

/// How a setting's text value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[default]
    String,
    Json,
    Number,
    Boolean,
}

/// A free-form key/value setting (contact details, company name, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Setting {
    pub key: String,
    /// Stored text form of the value.
    pub value: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub kind: SettingType,
    pub description: Option<String>,
}

impl Setting {
    /// Returns the value decoded according to its type.
    ///
    /// Malformed JSON falls back to the raw string, an unparsable number
    /// becomes `null`, and booleans are true only for the text `"true"`.
    pub fn typed_value(&self) -> serde_json::Value {
        match self.kind {
            SettingType::String => serde_json::Value::String(self.value.clone()),
            SettingType::Json => serde_json::from_str(&self.value)
                .unwrap_or_else(|_| serde_json::Value::String(self.value.clone())),
            SettingType::Number => self
                .value
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SettingType::Boolean => serde_json::Value::Bool(self.value == "true"),
        }
    }

    /// Encodes a JSON value into the stored text form for `kind`.
    pub fn encode_value(value: &serde_json::Value, kind: SettingType) -> String {
        match (kind, value) {
            (SettingType::Json, v) => v.to_string(),
            (_, serde_json::Value::String(s)) => s.clone(),
            (_, v) => v.to_string(),
        }
    }
}

// =============================================================================
// Payment Settings
// =============================================================================

/// Singleton payment configuration shown on the checkout page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub bank_name: String,
    pub account_holder_name: String,
    pub iban: String,
    pub bic_swift: String,
    pub stripe_public_key: String,
    /// Never echoed back to clients.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stripe_secret_key: String,
    pub paypal_business_email: String,
    pub paypal_instructions: String,
    pub bank_transfer_enabled: bool,
    pub stripe_enabled: bool,
    pub paypal_enabled: bool,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PaymentSettings {
    /// Default configuration created the first time it is read.
    pub fn defaults(now: DateTime<Utc>) -> Self {
        PaymentSettings {
            bank_name: "Banque Exemple".to_string(),
            account_holder_name: "FANDIAUTO".to_string(),
            iban: "DZ00 0000 0000 0000 0000 0000".to_string(),
            bic_swift: "XXXXDZXX".to_string(),
            stripe_public_key: String::new(),
            stripe_secret_key: String::new(),
            paypal_business_email: String::new(),
            paypal_instructions: "Send your payment to our PayPal account and include your reservation number in the note.".to_string(),
            bank_transfer_enabled: true,
            stripe_enabled: true,
            paypal_enabled: false,
            updated_at: now,
        }
    }

    /// Merges the supplied fields of a patch.
    pub fn apply_patch(&mut self, patch: PaymentSettingsPatch) {
        if let Some(v) = patch.bank_name {
            self.bank_name = v;
        }
        if let Some(v) = patch.account_holder_name {
            self.account_holder_name = v;
        }
        if let Some(v) = patch.iban {
            self.iban = v;
        }
        if let Some(v) = patch.bic_swift {
            self.bic_swift = v;
        }
        if let Some(v) = patch.stripe_public_key {
            self.stripe_public_key = v;
        }
        if let Some(v) = patch.stripe_secret_key {
            self.stripe_secret_key = v;
        }
        if let Some(v) = patch.paypal_business_email {
            self.paypal_business_email = v;
        }
        if let Some(v) = patch.paypal_instructions {
            self.paypal_instructions = v;
        }
        if let Some(v) = patch.bank_transfer_enabled {
            self.bank_transfer_enabled = v;
        }
        if let Some(v) = patch.stripe_enabled {
            self.stripe_enabled = v;
        }
        if let Some(v) = patch.paypal_enabled {
            self.paypal_enabled = v;
        }
    }
}

/// Partial payment settings update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettingsPatch {
    pub bank_name: Option<String>,
    pub account_holder_name: Option<String>,
    pub iban: Option<String>,
    pub bic_swift: Option<String>,
    pub stripe_public_key: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub paypal_business_email: Option<String>,
    pub paypal_instructions: Option<String>,
    pub bank_transfer_enabled: Option<bool>,
    pub stripe_enabled: Option<bool>,
    pub paypal_enabled: Option<bool>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_reservation() -> Reservation {
        let new = NewReservation {
            vehicle_id: Some("car1".into()),
            start_date: Some(date("2025-11-10")),
            end_date: Some(date("2025-11-12")),
            departure_agency: Some("Agence ANISTOUR Oran".into()),
            return_agency: Some("Aéroport de Chlef".into()),
            customer_name: Some("Ahmed Alami".into()),
            customer_email: Some("ahmed@example.com".into()),
            ..Default::default()
        };
        Reservation::from_new("r-1", new, 70, Utc::now())
    }

    #[test]
    fn test_only_accepted_blocks() {
        assert!(ReservationStatus::Accepted.blocks_availability());
        assert!(!ReservationStatus::Pending.blocks_availability());
        assert!(!ReservationStatus::Refused.blocks_availability());
    }

    #[test]
    fn test_new_reservation_defaults() {
        let r = sample_reservation();
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.payment_status, PaymentStatus::Pending);
        assert_eq!(r.customer_phone, "");
        assert!(!r.movement_applied);
        assert_eq!(r.total_price, 70);
    }

    #[test]
    fn test_reservation_patch_only_touches_supplied_fields() {
        let mut r = sample_reservation();
        r.apply_patch(ReservationPatch {
            status: Some(ReservationStatus::Accepted),
            customer_name: Some(String::new()),
            notes: Some("late arrival".into()),
            ..Default::default()
        });

        assert_eq!(r.status, ReservationStatus::Accepted);
        // Empty identity fields are ignored rather than blanked.
        assert_eq!(r.customer_name, "Ahmed Alami");
        assert_eq!(r.notes, "late arrival");
        assert_eq!(r.start_date, date("2025-11-10"));
    }

    #[test]
    fn test_relocation_due() {
        let mut r = sample_reservation();
        assert!(!r.relocation_due(date("2025-11-20")));

        r.status = ReservationStatus::Accepted;
        assert!(!r.relocation_due(date("2025-11-11")));
        assert!(r.relocation_due(date("2025-11-12")));

        r.movement_applied = true;
        assert!(!r.relocation_due(date("2025-11-20")));
    }

    #[test]
    fn test_vehicle_defaults() {
        let v = Vehicle::from_new(
            "car9",
            NewVehicle {
                name: Some("Clio 5".into()),
                daily_rate: Some(35),
                location_agency: Some("Agence ANISTOUR Oran".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(v.seats, 5);
        assert_eq!(v.fuel_type, "Essence SP");
        assert!(v.air_conditioning);
        assert_eq!(v.car_type, "Berline");
    }

    #[test]
    fn test_setting_typed_value() {
        let s = |value: &str, kind| Setting {
            key: "k".into(),
            value: value.into(),
            kind,
            description: None,
        };

        assert_eq!(s("42.5", SettingType::Number).typed_value(), serde_json::json!(42.5));
        assert_eq!(s("true", SettingType::Boolean).typed_value(), serde_json::json!(true));
        assert_eq!(s("yes", SettingType::Boolean).typed_value(), serde_json::json!(false));
        assert_eq!(
            s(r#"{"a":1}"#, SettingType::Json).typed_value(),
            serde_json::json!({"a": 1})
        );
        assert_eq!(s("{oops", SettingType::Json).typed_value(), serde_json::json!("{oops"));
    }

    #[test]
    fn test_setting_encode_value() {
        let v = serde_json::json!({"a": [1, 2]});
        assert_eq!(Setting::encode_value(&v, SettingType::Json), r#"{"a":[1,2]}"#);
        assert_eq!(
            Setting::encode_value(&serde_json::json!("hello"), SettingType::String),
            "hello"
        );
        assert_eq!(
            Setting::encode_value(&serde_json::json!(12), SettingType::Number),
            "12"
        );
    }

    #[test]
    fn test_payment_settings_hide_secret() {
        let mut settings = PaymentSettings::defaults(Utc::now());
        settings.stripe_secret_key = "sk_live_x".into();
        let json = serde_json::to_value(&settings).unwrap();
        assert!(json.get("stripeSecretKey").is_none());
        assert_eq!(json["paypalEnabled"], serde_json::json!(false));
    }
}
