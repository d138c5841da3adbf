//! `/create-payment-intent`

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Smallest currency unit; fractional values are rounded.
    pub amount: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "eur".to_string()
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<PaymentIntentRequest>,
) -> ApiResult<Json<Value>> {
    let amount = request
        .amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .map(|a| a.round() as i64)
        .ok_or_else(|| ApiError::BadRequest("Amount is required".to_string()))?;

    let intent = state
        .payments
        .create_payment_intent(amount, &request.currency)
        .await?;

    Ok(Json(json!({ "clientSecret": intent.client_secret })))
}
