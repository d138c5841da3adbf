//! Fleet management: `/cars`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use tracing::info;

use rentline_core::validation::{
    validate_agency, validate_daily_rate, validate_new_vehicle, validate_vehicle_name,
};
use rentline_core::{NewVehicle, Vehicle, VehiclePatch};
use rentline_db::DbError;

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::state::AppState;

fn car_not_found(err: DbError) -> ApiError {
    match err {
        DbError::NotFound { .. } => ApiError::NotFound("Car not found".to_string()),
        other => other.into(),
    }
}

/// A vehicle must sit at a known agency when agency validation is enforced.
fn check_location(state: &AppState, agency: &str) -> ApiResult<()> {
    let config = state.booking.config();
    validate_agency("locationAgency", agency, &config.agencies, config.enforce_agencies)?;
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(state.db.vehicles().list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Vehicle>> {
    state
        .db
        .vehicles()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))
}

/// Id is `car<unix millis>`.
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewVehicle>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    validate_new_vehicle(&new)?;
    check_location(&state, new.location_agency.as_deref().unwrap_or_default())?;

    let now = state.clock.now();
    let id = format!("car{}", now.timestamp_millis());
    let vehicle = Vehicle::from_new(id, new, now);

    let stored = state.db.vehicles().insert(&vehicle).await?;
    info!(vehicle_id = %stored.id, name = %stored.name, "Vehicle created");

    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<VehiclePatch>,
) -> ApiResult<Json<Vehicle>> {
    let mut vehicle = state
        .db
        .vehicles()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Car not found".to_string()))?;

    if let Some(name) = patch.name.as_deref() {
        validate_vehicle_name(name)?;
    }
    if let Some(rate) = patch.daily_rate {
        validate_daily_rate(rate)?;
    }
    if let Some(agency) = patch.location_agency.as_deref() {
        check_location(&state, agency)?;
    }

    vehicle.apply_patch(patch);
    let stored = state.db.vehicles().update(&vehicle).await.map_err(car_not_found)?;

    Ok(Json(stored))
}

/// Removes the vehicle and all its reservations.
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let removed = state.db.vehicles().delete(&id).await.map_err(car_not_found)?;
    info!(vehicle_id = %id, reservations = removed, "Vehicle deleted");

    Ok(Json(json!({
        "message": "Car and its reservations deleted successfully",
        "reservationsDeleted": removed,
    })))
}
