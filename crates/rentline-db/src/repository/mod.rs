//! # Repository Module
//!
//! Database repository implementations for Rentline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler / BookingService / RelocationReconciler                  │
//! │       │                                                                 │
//! │       │  db.reservations().insert_checked(&reservation)                │
//! │       ▼                                                                 │
//! │  ReservationRepository                                                 │
//! │  ├── list / get_by_id / insert / update / delete                       │
//! │  ├── insert_checked     (conflict check + insert, one transaction)     │
//! │  └── apply_relocation   (flag + vehicle move, one transaction)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`VehicleRepository`](vehicle::VehicleRepository) - Fleet CRUD and location moves
//! - [`ReservationRepository`](reservation::ReservationRepository) - Bookings and relocation
//! - [`SettingRepository`](setting::SettingRepository) - Key/value settings
//! - [`PaymentSettingsRepository`](payment_settings::PaymentSettingsRepository) - Singleton payment config

pub mod payment_settings;
pub mod reservation;
pub mod setting;
pub mod vehicle;
