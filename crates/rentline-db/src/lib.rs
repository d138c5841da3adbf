//! # rentline-db: Database Layer for Rentline
//!
//! SQLite storage for the fleet, reservations and settings, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentline Data Flow                               │
//! │                                                                         │
//! │  BookingService / HTTP handlers / RelocationReconciler                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   rentline-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌──────────────────┐   ┌──────────────┐ │   │
//! │  │   │   Database    │    │   Repositories   │   │  Migrations  │ │   │
//! │  │   │   (pool.rs)   │    │  vehicle         │   │  (embedded)  │ │   │
//! │  │   │               │◄───│  reservation     │   │ 001_initial  │ │   │
//! │  │   │ SqlitePool    │    │  setting         │   │              │ │   │
//! │  │   │               │    │  payment_settings│   │              │ │   │
//! │  │   └───────────────┘    └──────────────────┘   └──────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (or :memory: in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`seed`] - Demo fleet seeding
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentline_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./rentline.db")).await?;
//! let cars = db.vehicles().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use seed::{seed_if_empty, SeedReport};

pub use repository::payment_settings::PaymentSettingsRepository;
pub use repository::reservation::{InsertOutcome, RelocationOutcome, ReservationRepository};
pub use repository::setting::SettingRepository;
pub use repository::vehicle::VehicleRepository;
