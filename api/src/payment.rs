use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;

const STRIPE_API: &str = "https://api.stripe.com";

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a payment intent and returns the client secret the browser
    /// needs to confirm it.
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, AppError>;
}

pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: secret_key.into(),
            base_url: STRIPE_API.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct IntentResponse {
    client_secret: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Deserialize)]
struct StripeError {
    message: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<String, AppError> {
        let amount = amount_cents.to_string();
        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&[
                ("amount", amount.as_str()),
                ("currency", currency),
                ("payment_method_types[]", "card"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("status {status}"));
            tracing::warn!(%status, %message, "payment intent rejected");
            return Err(AppError::PaymentProvider(message));
        }

        let intent: IntentResponse = response.json().await?;
        Ok(intent.client_secret)
    }
}

/// Stand-in used when no provider secret is configured.
pub struct Disabled;

#[async_trait]
impl PaymentProvider for Disabled {
    async fn create_intent(&self, _amount_cents: i64, _currency: &str) -> Result<String, AppError> {
        Err(AppError::PaymentUnavailable)
    }
}

/// Converts a decimal price to the provider's smallest currency unit.
pub fn price_to_cents(price: f64) -> Result<i64, AppError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::bad_request("price must be a positive number"));
    }
    let cents = (price * 100.0).round();
    if cents > i64::MAX as f64 {
        return Err(AppError::bad_request("price is too large"));
    }
    Ok(cents as i64)
}
