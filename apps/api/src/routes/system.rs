//! Liveness, demo seeding and on-demand relocation.

use axum::extract::State;
use serde_json::{json, Value};

use rentline_booking::ReconcileReport;
use rentline_db::SeedReport;

use crate::error::ApiResult;
use crate::extract::Json;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": state.clock.now().to_rfc3339(),
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let ok = state.db.health_check().await;
    Json(json!({
        "ok": ok,
        "message": if ok { "API running" } else { "Database unavailable" },
        "dialect": "sqlite",
    }))
}

/// Loads the demo fleet when no vehicle exists yet.
pub async fn seed(State(state): State<AppState>) -> ApiResult<Json<SeedReport>> {
    Ok(Json(rentline_db::seed_if_empty(&state.db).await?))
}

/// Runs one relocation pass now.
pub async fn reconcile(State(state): State<AppState>) -> ApiResult<Json<ReconcileReport>> {
    Ok(Json(state.reconciler.run_now().await?))
}
