//! # Relocation Reconciler
//!
//! Moves vehicles to the return agency of reservations that have ended.
//!
//! ## Reconcile Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    RelocationReconciler                                 │
//! │                                                                         │
//! │  tick (interval) ─┐                                                     │
//! │  run_now()       ─┼──► run_once(today = clock.today())                  │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  1. Scan: list_pending_relocation(today)                                │
//! │           accepted, movement_applied = 0, end_date <= today             │
//! │           ORDER BY end_date, id                                         │
//! │                                                                         │
//! │  2. Apply: apply_relocation(id) per reservation, one tx each            │
//! │           ├── Moved           → relocated += 1                          │
//! │           ├── AlreadyThere    → unchanged += 1                          │
//! │           ├── AlreadyApplied  → skipped += 1  (raced another pass)      │
//! │           ├── Vanished        → skipped += 1  (deleted mid-scan)        │
//! │           └── Err             → failed += 1, logged, scan continues     │
//! │                                                                         │
//! │  A vehicle with several ended reservations ends at the return agency    │
//! │  of the one with the latest end date.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use rentline_core::Clock;
use rentline_db::{Database, RelocationOutcome};

use crate::error::{BookingError, BookingResult};

/// Counters of a single reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Reservations returned by the scan.
    pub scanned: usize,
    /// Vehicles moved to a new agency.
    pub relocated: usize,
    /// Flag set, vehicle already at the return agency.
    pub unchanged: usize,
    /// Already applied or deleted since the scan.
    pub skipped: usize,
    /// Reservations whose relocation errored.
    pub failed: usize,
}

type TriggerReply = oneshot::Sender<BookingResult<ReconcileReport>>;

// =============================================================================
// Reconciler
// =============================================================================

/// Background task applying post-return vehicle relocations.
pub struct RelocationReconciler {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    interval: Duration,

    /// On-demand pass requests.
    trigger_rx: mpsc::Receiver<TriggerReply>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for controlling the reconciler.
#[derive(Clone)]
pub struct ReconcilerHandle {
    shutdown_tx: mpsc::Sender<()>,
    trigger_tx: mpsc::Sender<TriggerReply>,
}

impl ReconcilerHandle {
    /// Runs one pass inside the reconciler task and waits for its report.
    pub async fn run_now(&self) -> BookingResult<ReconcileReport> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.trigger_tx
            .send(reply_tx)
            .await
            .map_err(|_| BookingError::ReconcilerStopped)?;

        reply_rx.await.map_err(|_| BookingError::ReconcilerStopped)?
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> BookingResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| BookingError::ReconcilerStopped)
    }
}

impl RelocationReconciler {
    /// Creates a reconciler and returns a handle.
    pub fn new(
        db: Arc<Database>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> (Self, ReconcilerHandle) {
        let (trigger_tx, trigger_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let reconciler = RelocationReconciler {
            db,
            clock,
            interval,
            trigger_rx,
            shutdown_rx,
        };

        let handle = ReconcilerHandle {
            shutdown_tx,
            trigger_tx,
        };

        (reconciler, handle)
    }

    /// Runs the reconcile loop until shutdown.
    ///
    /// Spawn as a background task. The first pass runs immediately.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Relocation reconciler starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(?e, "Failed to run relocation pass");
                    }
                }

                Some(reply) = self.trigger_rx.recv() => {
                    let result = self.run_once().await;
                    // Caller may have gone away
                    let _ = reply.send(result);
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Relocation reconciler shutting down");
                    break;
                }
            }
        }

        info!("Relocation reconciler stopped");
    }

    /// Runs a single reconciliation pass.
    pub async fn run_once(&self) -> BookingResult<ReconcileReport> {
        let today = self.clock.today();
        let pending = self.db.reservations().list_pending_relocation(today).await?;

        let mut report = ReconcileReport {
            scanned: pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            debug!(%today, "No pending relocations");
            return Ok(report);
        }

        for reservation in &pending {
            match self.db.reservations().apply_relocation(&reservation.id).await {
                Ok(RelocationOutcome::Moved { vehicle_id, to }) => {
                    info!(
                        reservation_id = %reservation.id,
                        vehicle_id = %vehicle_id,
                        to = %to,
                        "Vehicle relocated"
                    );
                    report.relocated += 1;
                }
                Ok(RelocationOutcome::AlreadyThere { .. }) => report.unchanged += 1,
                Ok(RelocationOutcome::AlreadyApplied) | Ok(RelocationOutcome::Vanished) => {
                    report.skipped += 1
                }
                Err(e) => {
                    error!(?e, reservation_id = %reservation.id, "Failed to apply relocation");
                    report.failed += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            relocated = report.relocated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            failed = report.failed,
            "Relocation pass complete"
        );

        Ok(report)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rentline_core::{FixedClock, NewReservation, NewVehicle, Reservation, ReservationStatus, Vehicle};
    use rentline_db::DbConfig;

    const ORAN: &str = "Agence ANISTOUR Oran";
    const CHLEF: &str = "Aéroport de Chlef";
    const TLEMCEN: &str = "Agence ANISTOUR Tlemcen";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn setup() -> (Arc<Database>, Arc<FixedClock>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car = Vehicle::from_new(
            "car1",
            NewVehicle {
                name: Some("Clio 5".into()),
                daily_rate: Some(35),
                image: Some("images/clio5.jpg".into()),
                location_agency: Some(ORAN.into()),
                ..Default::default()
            },
            Utc::now(),
        );
        db.vehicles().insert(&car).await.unwrap();

        (Arc::new(db), Arc::new(FixedClock::on(date("2025-11-20"))))
    }

    async fn book(
        db: &Database,
        id: &str,
        start: &str,
        end: &str,
        return_agency: &str,
        status: ReservationStatus,
    ) -> Reservation {
        let r = Reservation::from_new(
            id,
            NewReservation {
                vehicle_id: Some("car1".into()),
                start_date: Some(date(start)),
                end_date: Some(date(end)),
                departure_agency: Some(ORAN.into()),
                return_agency: Some(return_agency.into()),
                customer_name: Some("Sara".into()),
                customer_email: Some("sara@example.com".into()),
                status: Some(status),
                ..Default::default()
            },
            70,
            Utc::now(),
        );
        db.reservations().insert(&r).await.unwrap()
    }

    async fn location(db: &Database) -> String {
        db.vehicles().get_by_id("car1").await.unwrap().unwrap().location_agency
    }

    #[tokio::test]
    async fn test_relocates_once() {
        let (db, clock) = setup().await;
        book(&db, "r1", "2025-11-10", "2025-11-12", CHLEF, ReservationStatus::Accepted).await;

        let (reconciler, _handle) = RelocationReconciler::new(db.clone(), clock, Duration::from_secs(60));

        let first = reconciler.run_once().await.unwrap();
        assert_eq!(first.scanned, 1);
        assert_eq!(first.relocated, 1);
        assert_eq!(location(&db).await, CHLEF);

        let second = reconciler.run_once().await.unwrap();
        assert_eq!(second, ReconcileReport::default());

        let r1 = db.reservations().get_by_id("r1").await.unwrap().unwrap();
        assert!(r1.movement_applied);
    }

    #[tokio::test]
    async fn test_ignores_future_and_unaccepted() {
        let (db, clock) = setup().await;
        book(&db, "future", "2025-11-25", "2025-11-28", CHLEF, ReservationStatus::Accepted).await;
        book(&db, "pending", "2025-11-01", "2025-11-03", CHLEF, ReservationStatus::Pending).await;
        book(&db, "refused", "2025-11-04", "2025-11-06", CHLEF, ReservationStatus::Refused).await;

        let (reconciler, _handle) = RelocationReconciler::new(db.clone(), clock.clone(), Duration::from_secs(60));

        assert_eq!(reconciler.run_once().await.unwrap().scanned, 0);
        assert_eq!(location(&db).await, ORAN);

        // Return day reached
        clock.set_date(date("2025-11-28"));
        let report = reconciler.run_once().await.unwrap();
        assert_eq!(report.relocated, 1);
        assert_eq!(location(&db).await, CHLEF);
    }

    #[tokio::test]
    async fn test_latest_return_wins() {
        let (db, clock) = setup().await;
        book(&db, "late", "2025-11-14", "2025-11-16", TLEMCEN, ReservationStatus::Accepted).await;
        book(&db, "early", "2025-11-10", "2025-11-12", CHLEF, ReservationStatus::Accepted).await;

        let (reconciler, _handle) = RelocationReconciler::new(db.clone(), clock, Duration::from_secs(60));

        let report = reconciler.run_once().await.unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.relocated, 2);
        assert_eq!(location(&db).await, TLEMCEN);
    }

    #[tokio::test]
    async fn test_same_agency_counts_unchanged() {
        let (db, clock) = setup().await;
        book(&db, "r1", "2025-11-10", "2025-11-12", ORAN, ReservationStatus::Accepted).await;

        let (reconciler, _handle) = RelocationReconciler::new(db.clone(), clock, Duration::from_secs(60));

        let report = reconciler.run_once().await.unwrap();
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.relocated, 0);
        assert!(db.reservations().get_by_id("r1").await.unwrap().unwrap().movement_applied);
    }

    #[tokio::test]
    async fn test_run_now_and_shutdown() {
        let (db, clock) = setup().await;
        book(&db, "r1", "2025-11-10", "2025-11-12", CHLEF, ReservationStatus::Accepted).await;

        let (reconciler, handle) =
            RelocationReconciler::new(db.clone(), clock, Duration::from_secs(3600));
        let task = tokio::spawn(reconciler.run());

        // The immediate first tick may already have applied it
        let report = handle.run_now().await.unwrap();
        assert_eq!(report.failed, 0);
        assert_eq!(location(&db).await, CHLEF);

        handle.shutdown().await.unwrap();
        task.await.unwrap();

        assert!(matches!(
            handle.run_now().await,
            Err(BookingError::ReconcilerStopped)
        ));
    }
}
