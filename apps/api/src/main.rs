//! # Rentline API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  startup                                                                │
//! │    1. tracing (RUST_LOG, default info,rentline=debug)                   │
//! │    2. ApiConfig::load (file → env → validate)                           │
//! │    3. Database::new (migrations) + optional demo seed                   │
//! │    4. spawn RelocationReconciler                                        │
//! │    5. axum::serve with graceful shutdown (Ctrl+C / SIGTERM)             │
//! │    6. stop reconciler, close pool                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rentline_api::payment::StripeGateway;
use rentline_api::{router, ApiConfig, AppState};
use rentline_booking::{BookingService, RelocationReconciler};
use rentline_core::{Clock, SystemClock};
use rentline_db::{seed_if_empty, Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rentline=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Rentline API server...");

    let config = ApiConfig::load(None).context("loading configuration")?;
    let addr = config.socket_addr()?;
    info!(
        %addr,
        db = %config.database.path.display(),
        reconcile_secs = config.booking.reconcile_interval_secs,
        stripe = config.payments.stripe_secret_key.is_some(),
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.database.path)
        .max_connections(config.database.max_connections);
    let db = Arc::new(Database::new(db_config).await.context("opening database")?);
    info!("Database ready");

    if config.database.auto_seed {
        let report = seed_if_empty(&db).await.context("seeding demo data")?;
        if report.seeded {
            info!(vehicles = report.vehicles, reservations = report.reservations, "Demo data seeded");
        }
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let booking = Arc::new(BookingService::new(
        db.clone(),
        config.booking_config(),
        clock.clone(),
    ));

    let (reconciler, reconciler_handle) =
        RelocationReconciler::new(db.clone(), clock.clone(), config.reconcile_interval());
    let reconciler_task = tokio::spawn(reconciler.run());

    let payments = StripeGateway::new(
        config.payments.stripe_api_base.clone(),
        config.payments.stripe_secret_key.clone(),
    )?;
    if config.payments.stripe_secret_key.is_none() {
        warn!("STRIPE_SECRET_KEY not set, payment intents will fail");
    }

    let state = AppState {
        db: db.clone(),
        booking,
        reconciler: reconciler_handle.clone(),
        payments: Arc::new(payments),
        clock,
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = reconciler_handle.shutdown().await {
        warn!(?e, "Reconciler already stopped");
    }
    if let Err(e) = reconciler_task.await {
        warn!(?e, "Reconciler task failed");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(?e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
