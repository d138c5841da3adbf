//! Booking endpoints: `/reservations` and `/quote`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use rentline_core::{NewReservation, PriceBreakdown, Reservation, ReservationPatch, ValidationError};

use crate::error::ApiResult;
use crate::extract::{Json, Query};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub car_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Reservation>>> {
    let car_id = query.car_id.as_deref().filter(|id| !id.is_empty());
    Ok(Json(state.db.reservations().list(car_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewReservation>,
) -> ApiResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.booking.create(new).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ReservationPatch>,
) -> ApiResult<Json<Reservation>> {
    Ok(Json(state.booking.update(&id, patch).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    state.booking.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub car_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_apply_discount")]
    pub apply_discount: bool,
}

fn default_apply_discount() -> bool {
    true
}

pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> ApiResult<Json<PriceBreakdown>> {
    let car_id = request.car_id.filter(|id| !id.is_empty());
    let (Some(car_id), Some(start), Some(end)) = (car_id, request.start_date, request.end_date) else {
        return Err(ValidationError::MissingFields {
            fields: vec!["carId".into(), "startDate".into(), "endDate".into()],
        }
        .into());
    };

    let breakdown = state
        .booking
        .quote(&car_id, start, end, request.apply_discount)
        .await?;

    Ok(Json(breakdown))
}
