//! # Payment Gateway
//!
//! Pass-through to the card payment provider. The server never stores card
//! data; it asks the provider for a payment intent and hands the client
//! secret to the browser.
//!
//! ```text
//! POST /create-payment-intent {amount, currency}
//!        │
//!        ▼
//! PaymentGateway::create_payment_intent
//!        │   StripeGateway: POST {api_base}/v1/payment_intents
//!        │                  amount, currency, automatic_payment_methods[enabled]
//!        ▼
//! {clientSecret}
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Boxed future returned by gateway calls.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PaymentError>> + Send + 'a>>;

/// Payment provider failures.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("Payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected payment provider response: {0}")]
    InvalidResponse(String),
}

/// A created payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Creates payment intents with an external provider.
pub trait PaymentGateway: Send + Sync {
    /// `amount` is in the currency's smallest unit.
    fn create_payment_intent<'a>(
        &'a self,
        amount: i64,
        currency: &'a str,
    ) -> GatewayFuture<'a, PaymentIntent>;
}

// =============================================================================
// Stripe
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Stripe REST adapter.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeGateway {
    pub fn new(api_base: impl Into<String>, secret_key: Option<String>) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(StripeGateway {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    async fn post_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        let key = self
            .secret_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(PaymentError::NotConfigured)?;

        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let intent = response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        debug!(intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }
}

impl PaymentGateway for StripeGateway {
    fn create_payment_intent<'a>(
        &'a self,
        amount: i64,
        currency: &'a str,
    ) -> GatewayFuture<'a, PaymentIntent> {
        Box::pin(self.post_intent(amount, currency))
    }
}
