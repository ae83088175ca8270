//! Reqwest-backed implementation of [`PaymentsApi`].

use async_trait::async_trait;
use normalize::{CheckoutSession, RawPayment};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::{PaymentsApi, UpstreamConfig, UpstreamError};

/// HTTP client for the upstream processor's REST API.
///
/// Bearer-authenticated, with a bounded per-request timeout. Construct once
/// and share; `reqwest::Client` pools connections internally.
pub struct HttpPaymentsApi {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpPaymentsApi {
    /// Build a client from configuration. Fails fast when the secret key is
    /// missing rather than letting the first request 401.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.secret_key.is_empty() {
            return Err(UpstreamError::Config(
                "secret key is not configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, config })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.secret_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Standard list envelope used by every upstream listing endpoint.
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
}

#[async_trait]
impl PaymentsApi for HttpPaymentsApi {
    async fn list_payments(&self) -> Result<Vec<RawPayment>, UpstreamError> {
        let limit = self.config.page_limit.to_string();
        let mut payments: Vec<RawPayment> = Vec::new();

        loop {
            let cursor = payments.last().map(|payment| payment.id.clone());
            let mut query: Vec<(&str, &str)> = vec![
                ("limit", limit.as_str()),
                ("expand[]", "data.customer"),
                ("expand[]", "data.latest_charge"),
            ];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("starting_after", cursor));
            }

            let page: ListEnvelope<RawPayment> =
                self.get_json("/v1/payment_intents", &query).await?;
            let received = page.data.len();
            payments.extend(page.data);
            debug!(received, total = payments.len(), "payments_page_fetched");

            if !page.has_more || received == 0 || payments.len() >= self.config.max_records {
                break;
            }
        }

        payments.truncate(self.config.max_records);
        Ok(payments)
    }

    async fn checkout_session(
        &self,
        payment_id: &str,
    ) -> Result<Option<CheckoutSession>, UpstreamError> {
        let page: ListEnvelope<CheckoutSession> = self
            .get_json(
                "/v1/checkout/sessions",
                &[("payment_intent", payment_id), ("limit", "1")],
            )
            .await?;

        Ok(page.data.into_iter().next())
    }
}
