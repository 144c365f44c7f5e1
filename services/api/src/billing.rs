//! Payment provider client
//!
//! The hosted provider (customer records, card tokenization, payment
//! intents) is a black box; this client covers the two calls the
//! purchase flows need. All failures are terminal for the request, no
//! retries.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Billing configuration
#[derive(Debug, Clone)]
pub struct BillingConfig {
    /// Base URL of the payment provider API
    pub base_url: String,
    /// Secret API key sent as a bearer token
    pub secret_key: String,
    /// ISO currency code used for all charges
    pub currency: String,
}

impl BillingConfig {
    /// Create a new BillingConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BILLING_API_URL`: provider base URL
    /// - `BILLING_SECRET_KEY`: provider secret key
    /// - `BILLING_CURRENCY`: currency code (default: "usd")
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BILLING_API_URL")
            .map_err(|_| anyhow::anyhow!("BILLING_API_URL environment variable not set"))?;
        let secret_key = std::env::var("BILLING_SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("BILLING_SECRET_KEY environment variable not set"))?;
        let currency = std::env::var("BILLING_CURRENCY").unwrap_or_else(|_| "usd".to_string());

        Ok(BillingConfig {
            base_url,
            secret_key,
            currency,
        })
    }
}

/// Customer record at the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCustomer {
    pub id: String,
}

/// Payment intent created at the provider
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
}

#[derive(Serialize)]
struct CreateCustomerRequest<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct CreateIntentRequest<'a> {
    customer: &'a str,
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<&'a str>,
}

/// HTTP client for the payment provider
#[derive(Clone)]
pub struct BillingClient {
    http: reqwest::Client,
    config: BillingConfig,
}

impl BillingClient {
    pub fn new(config: BillingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Create a customer record at the provider
    pub async fn create_customer(&self, email: &str, name: &str) -> Result<ProviderCustomer> {
        info!("Creating provider customer for {}", email);

        let response = self
            .http
            .post(format!("{}/v1/customers", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&CreateCustomerRequest { email, name })
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Create a payment intent for the given amount
    pub async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount_cents: i64,
        payment_method: Option<&str>,
    ) -> Result<PaymentIntent> {
        info!(
            "Creating payment intent of {} {} for customer {}",
            amount_cents, self.config.currency, customer_id
        );

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.base_url))
            .bearer_auth(&self.config.secret_key)
            .json(&CreateIntentRequest {
                customer: customer_id,
                amount: amount_cents,
                currency: &self.config.currency,
                payment_method,
            })
            .send()
            .await?
            .error_for_status()?;

        let intent: PaymentIntent = response.json().await?;
        info!("Payment intent {} created with status {}", intent.id, intent.status);

        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn billing_config_requires_credentials() {
        unsafe {
            std::env::remove_var("BILLING_API_URL");
            std::env::remove_var("BILLING_SECRET_KEY");
        }
        assert!(BillingConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn billing_config_defaults_currency() {
        unsafe {
            std::env::set_var("BILLING_API_URL", "https://pay.example.test");
            std::env::set_var("BILLING_SECRET_KEY", "sk_test_123");
            std::env::remove_var("BILLING_CURRENCY");
        }
        let config = BillingConfig::from_env().unwrap();
        assert_eq!(config.currency, "usd");
        unsafe {
            std::env::remove_var("BILLING_API_URL");
            std::env::remove_var("BILLING_SECRET_KEY");
        }
    }
}
