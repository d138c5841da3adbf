//! # HTTP Routes
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Route                        │ Handler                                  │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ GET    /health               │ system::health                           │
//! │ GET    /status               │ system::status                           │
//! │ POST   /seed                 │ system::seed                             │
//! │ POST   /reconcile            │ system::reconcile                        │
//! │ GET    /cars                 │ vehicles::list                           │
//! │ POST   /cars                 │ vehicles::create                         │
//! │ GET    /cars/{id}            │ vehicles::get                            │
//! │ PUT    /cars/{id}            │ vehicles::update                         │
//! │ DELETE /cars/{id}            │ vehicles::delete                         │
//! │ GET    /reservations         │ reservations::list   (?carId=)           │
//! │ POST   /reservations         │ reservations::create                     │
//! │ PUT    /reservations/{id}    │ reservations::update                     │
//! │ DELETE /reservations/{id}    │ reservations::delete                     │
//! │ POST   /quote                │ reservations::quote                      │
//! │ GET    /settings             │ settings::list                           │
//! │ POST   /settings/contact     │ settings::update_contact                 │
//! │ GET    /settings/{key}       │ settings::get                            │
//! │ PUT    /settings/{key}       │ settings::put                            │
//! │ GET    /payment-settings     │ settings::get_payment_settings           │
//! │ PUT    /payment-settings     │ settings::update_payment_settings        │
//! │ POST   /create-payment-intent│ payments::create_payment_intent          │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```

pub mod payments;
pub mod reservations;
pub mod settings;
pub mod system;
pub mod vehicles;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/status", get(system::status))
        .route("/seed", post(system::seed))
        .route("/reconcile", post(system::reconcile))
        .route("/cars", get(vehicles::list).post(vehicles::create))
        .route(
            "/cars/{id}",
            get(vehicles::get).put(vehicles::update).delete(vehicles::delete),
        )
        .route(
            "/reservations",
            get(reservations::list).post(reservations::create),
        )
        .route(
            "/reservations/{id}",
            axum::routing::put(reservations::update).delete(reservations::delete),
        )
        .route("/quote", post(reservations::quote))
        .route("/settings", get(settings::list))
        .route("/settings/contact", post(settings::update_contact))
        .route("/settings/{key}", get(settings::get).put(settings::put))
        .route(
            "/payment-settings",
            get(settings::get_payment_settings).put(settings::update_payment_settings),
        )
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Test Support
// =============================================================================
