use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("Payment provider request failed: {0}")]
    Request(String),

    #[error("Payment provider rejected the request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Request(err.to_string())
    }
}

/// Card-payment provider. Returns the client secret the frontend needs to
/// confirm the payment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_payment_intent(&self, amount: u64, currency: &str)
        -> Result<String, PaymentError>;
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Stripe payment intents API.
pub struct StripePayments {
    client: Client,
    secret_key: String,
    api_url: String,
}

impl StripePayments {
    pub fn new(secret_key: String, api_url: String) -> Self {
        Self {
            client: Client::new(),
            secret_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for StripePayments {
    async fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> Result<String, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let url = format!("{}/v1/payment_intents", self.api_url);
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("payment_method_types[]", "card"),
        ];
        debug!(%url, %amount, currency, "Creating payment intent");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|response| response.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            error!(%status, reason = %message, "Payment intent creation failed");
            return Err(PaymentError::Rejected(message));
        }

        let intent: PaymentIntentResponse = serde_json::from_str(&body)
            .map_err(|err| PaymentError::Request(format!("Failed to parse response: {err}")))?;
        info!(id = %intent.id, "Created payment intent");
        Ok(intent.client_secret)
    }
}
