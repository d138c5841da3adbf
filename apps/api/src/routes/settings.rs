//! Site settings, contact details and the payment settings singleton.

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use rentline_core::validation::{validate_email, validate_phone};
use rentline_core::{PaymentSettings, PaymentSettingsPatch, Setting, SettingType};

use crate::error::{ApiError, ApiResult};
use crate::extract::Json;
use crate::state::AppState;

/// `(key, description)` of the contact settings written by `/settings/contact`.
const CONTACT_KEYS: [(&str, &str); 3] = [
    ("contact_phone", "Contact phone number"),
    ("contact_email", "Contact email address"),
    ("contact_address", "Physical address"),
];

fn setting_json(setting: &Setting) -> Value {
    json!({
        "key": setting.key,
        "value": setting.typed_value(),
        "type": setting.kind,
        "description": setting.description,
    })
}

/// All settings as one `{key: typedValue}` object.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let settings = state.db.settings().list().await?;

    let object: Map<String, Value> = settings
        .iter()
        .map(|s| (s.key.clone(), s.typed_value()))
        .collect();

    Ok(Json(Value::Object(object)))
}

pub async fn get(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Json<Value>> {
    let setting = state
        .db
        .settings()
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound("Setting not found".to_string()))?;

    Ok(Json(setting_json(&setting)))
}

#[derive(Debug, Deserialize)]
pub struct PutSetting {
    pub value: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<SettingType>,
    pub description: Option<String>,
}

/// Creates or replaces a setting.
///
/// Without `type` an existing setting keeps its type and a new one is a
/// string.
pub async fn put(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<PutSetting>,
) -> ApiResult<Json<Value>> {
    let value = body
        .value
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::BadRequest("Value is required".to_string()))?;

    let kind = match body.kind {
        Some(kind) => kind,
        None => state
            .db
            .settings()
            .get(&key)
            .await?
            .map(|existing| existing.kind)
            .unwrap_or_default(),
    };

    let encoded = Setting::encode_value(&value, kind);
    let (setting, created) = state
        .db
        .settings()
        .upsert(&key, &encoded, kind, body.description.as_deref())
        .await?;

    info!(key = %key, created, "Setting saved");

    Ok(Json(json!({
        "success": true,
        "setting": {
            "key": setting.key,
            "value": value,
            "type": setting.kind,
            "description": setting.description,
        },
        "created": created,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Validates and stores the three contact settings.
pub async fn update_contact(
    State(state): State<AppState>,
    Json(body): Json<ContactInfo>,
) -> ApiResult<Json<Value>> {
    let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    let (Some(phone), Some(email), Some(address)) =
        (present(body.phone), present(body.email), present(body.address))
    else {
        return Err(ApiError::BadRequest(
            "All fields are required (phone, email, address)".to_string(),
        ));
    };

    validate_email(&email).map_err(|_| ApiError::BadRequest("Invalid email format".to_string()))?;
    validate_phone(&phone).map_err(|_| ApiError::BadRequest("Invalid phone number".to_string()))?;

    let repo = state.db.settings();
    for ((key, description), value) in CONTACT_KEYS.iter().zip([&phone, &email, &address]) {
        repo.upsert(key, value, SettingType::String, Some(*description))
            .await?;
    }

    info!("Contact information updated");

    Ok(Json(json!({
        "success": true,
        "message": "Contact information updated successfully",
        "data": { "phone": phone, "email": email, "address": address },
    })))
}

// =============================================================================
// Payment Settings
// =============================================================================

pub async fn get_payment_settings(State(state): State<AppState>) -> ApiResult<Json<PaymentSettings>> {
    Ok(Json(state.db.payment_settings().get_or_create_default().await?))
}

pub async fn update_payment_settings(
    State(state): State<AppState>,
    Json(patch): Json<PaymentSettingsPatch>,
) -> ApiResult<Json<PaymentSettings>> {
    let repo = state.db.payment_settings();
    let mut settings = repo.get_or_create_default().await?;
    settings.apply_patch(patch);

    let stored = repo.update(&settings).await?;
    info!("Payment settings updated");

    Ok(Json(stored))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, seeded_app, send};

    #[tokio::test]
    async fn test_list_typed_values() {
        let app = seeded_app().await;
        let (status, body) = send(&app.router, "GET", "/settings", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company_name"], "FANDIAUTO");
        assert_eq!(body["contact_email"], "contact@fandiauto.com");
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let app = app().await;

        let (status, body) = send(
            &app.router,
            "PUT",
            "/settings/max_days",
            Some(json!({ "value": 30, "type": "number", "description": "Longest rental" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["created"], true);
        assert_eq!(body["setting"]["value"], 30);

        // Type and description are kept when omitted
        let (_, body) = send(&app.router, "PUT", "/settings/max_days", Some(json!({ "value": 45 }))).await;
        assert_eq!(body["created"], false);
        assert_eq!(body["setting"]["type"], "number");
        assert_eq!(body["setting"]["description"], "Longest rental");

        let (status, body) = send(&app.router, "GET", "/settings/max_days", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["value"], 45.0);
        assert_eq!(body["type"], "number");

        let (status, body) = send(&app.router, "PUT", "/settings/max_days", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Value is required");

        let (status, body) = send(&app.router, "GET", "/settings/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Setting not found");
    }

    #[tokio::test]
    async fn test_json_setting_round_trips_as_object() {
        let app = app().await;
        send(
            &app.router,
            "PUT",
            "/settings/hours",
            Some(json!({ "value": { "open": "08:00", "close": "19:00" }, "type": "json" })),
        )
        .await;

        let (_, body) = send(&app.router, "GET", "/settings", None).await;
        assert_eq!(body["hours"]["open"], "08:00");
    }

    #[tokio::test]
    async fn test_contact_validation() {
        let app = app().await;

        let (status, body) = send(
            &app.router,
            "POST",
            "/settings/contact",
            Some(json!({ "phone": "+213 771 39 14 80", "email": "contact@fandiauto.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "All fields are required (phone, email, address)");

        let (_, body) = send(
            &app.router,
            "POST",
            "/settings/contact",
            Some(json!({ "phone": "+213 771 39 14 80", "email": "contact@", "address": "Oran" })),
        )
        .await;
        assert_eq!(body["error"], "Invalid email format");

        let (_, body) = send(
            &app.router,
            "POST",
            "/settings/contact",
            Some(json!({ "phone": "12-34", "email": "contact@fandiauto.com", "address": "Oran" })),
        )
        .await;
        assert_eq!(body["error"], "Invalid phone number");

        let (status, body) = send(
            &app.router,
            "POST",
            "/settings/contact",
            Some(json!({ "phone": "+213 771 39 14 80", "email": "info@fandiauto.com", "address": "Oran" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "info@fandiauto.com");

        let (_, body) = send(&app.router, "GET", "/settings/contact_email", None).await;
        assert_eq!(body["value"], "info@fandiauto.com");
        assert_eq!(body["description"], "Contact email address");
    }

    #[tokio::test]
    async fn test_payment_settings_defaults_and_update() {
        let app = app().await;

        let (status, body) = send(&app.router, "GET", "/payment-settings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bankName"], "Banque Exemple");
        assert_eq!(body["stripeEnabled"], true);
        assert!(body.get("stripeSecretKey").is_none());

        let (status, body) = send(
            &app.router,
            "PUT",
            "/payment-settings",
            Some(json!({ "paypalEnabled": true, "stripeSecretKey": "sk_test_x" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["paypalEnabled"], true);
        assert_eq!(body["bankName"], "Banque Exemple");
        assert!(body.get("stripeSecretKey").is_none());
    }
}
