//! Hosted-checkout payment provider client (Stripe-compatible API).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use uuid::Uuid;

use super::{ProviderError, check_status};

const PROVIDER: &str = "payment";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    /// Minor currency units; the session is scoped to exactly this amount.
    pub amount: i64,
    pub currency: String,
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Reconciliation key; must round-trip through the provider verbatim.
    pub booking_id: Uuid,
    /// Unix timestamp after which the session expires.
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub session_id: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Completed,
    Expired,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_session(
        &self,
        req: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProviderError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ProviderError>;
}

#[derive(Debug)]
pub struct HostedCheckoutClient {
    http: reqwest::Client,
    base_url: String,
}

impl HostedCheckoutClient {
    pub fn new(base_url: &str, secret_key: &str) -> Result<Self, ProviderError> {
        if secret_key.is_empty() {
            return Err(ProviderError::Config("payment secret key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("Bearer {secret_key}"))
            .map_err(|_| ProviderError::Config("Invalid payment secret key format".into()))?;
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
}

#[async_trait]
impl PaymentProvider for HostedCheckoutClient {
    async fn create_session(
        &self,
        req: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, ProviderError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let params: Vec<(&str, String)> = vec![
            ("mode", "payment".into()),
            ("success_url", req.success_url.clone()),
            ("cancel_url", req.cancel_url.clone()),
            ("line_items[0][quantity]", "1".into()),
            ("line_items[0][price_data][currency]", req.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]",
                req.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                req.product_name.clone(),
            ),
            ("metadata[booking_id]", req.booking_id.to_string()),
            ("expires_at", req.expires_at.to_string()),
        ];

        let resp = self.http.post(&url).form(&params).send().await?;
        check_status(PROVIDER, &resp)?;
        let session: SessionObject = resp.json().await?;

        let redirect_url = session.url.ok_or(ProviderError::Decode {
            provider: PROVIDER,
            message: "checkout session has no redirect URL".into(),
        })?;

        Ok(CheckoutSession {
            session_id: session.id,
            redirect_url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, ProviderError> {
        let url = format!("{}/v1/checkout/sessions/{session_id}", self.base_url);
        let resp = self.http.get(&url).send().await?;
        check_status(PROVIDER, &resp)?;
        let session: SessionObject = resp.json().await?;

        let status = match (session.status.as_deref(), session.payment_status.as_deref()) {
            (Some("complete"), Some("paid")) => SessionStatus::Completed,
            (Some("expired"), _) => SessionStatus::Expired,
            _ => SessionStatus::Open,
        };
        Ok(status)
    }
}
