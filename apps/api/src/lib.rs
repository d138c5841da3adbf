//! # Rentline API
//!
//! HTTP surface of the car rental backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Rentline API                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes        │  │  state         │  │  payment                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • vehicles     │  │ • Database     │  │ • PaymentGateway (trait)   ││
//! │  │ • reservations │─►│ • Booking      │  │ • StripeGateway (reqwest)  ││
//! │  │ • settings     │  │ • Reconciler   │  │                            ││
//! │  │ • payments     │  │ • Clock        │  └────────────────────────────┘│
//! │  │ • system       │  └────────────────┘                                │
//! │  └────────────────┘                                                    │
//! │                                                                         │
//! │  config: rentline.toml + RENTLINE_* env    error: ApiError → JSON      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod payment;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
