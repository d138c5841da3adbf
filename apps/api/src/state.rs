//! Shared application state passed to every handler.

use std::sync::Arc;

use rentline_booking::{BookingService, ReconcilerHandle};
use rentline_core::Clock;
use rentline_db::Database;

use crate::payment::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub booking: Arc<BookingService>,
    pub reconciler: ReconcilerHandle,
    pub payments: Arc<dyn PaymentGateway>,
    pub clock: Arc<dyn Clock>,
}
