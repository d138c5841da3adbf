//! # rentline-booking: Reservation Lifecycle for Rentline
//!
//! Glues the pure pricing and availability rules of `rentline-core` to the
//! repositories of `rentline-db`.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌───────────────────────────┐      ┌────────────────────────────────┐ │
//! │  │      BookingService       │      │     RelocationReconciler       │ │
//! │  │                           │      │                                │ │
//! │  │  create  (lock + tx)      │      │  interval tick / run_now()     │ │
//! │  │  update  (merge)          │      │  ended + accepted + !applied   │ │
//! │  │  delete                   │      │  → vehicle.location = return   │ │
//! │  │  quote   (fallback rate)  │      │                                │ │
//! │  └─────────────┬─────────────┘      └───────────────┬────────────────┘ │
//! │                │                                    │                  │
//! │                └──────────────┬─────────────────────┘                  │
//! │                               ▼                                        │
//! │                    Arc<Database> (rentline-db)                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let db = Arc::new(Database::new(DbConfig::new("rentline.db")).await?);
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock);
//!
//! let service = BookingService::new(db.clone(), BookingConfig::default(), clock.clone());
//! let (reconciler, handle) = RelocationReconciler::new(db, clock, Duration::from_secs(300));
//! tokio::spawn(reconciler.run());
//! ```

pub mod config;
pub mod error;
pub mod reconciler;
pub mod service;

pub use config::BookingConfig;
pub use error::{BookingError, BookingResult};
pub use reconciler::{ReconcileReport, ReconcilerHandle, RelocationReconciler};
pub use service::BookingService;
