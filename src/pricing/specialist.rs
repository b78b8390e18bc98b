//! Specialist estimator: a fine-tuned, narrow-domain pricing model served
//! behind a plain HTTP endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::pricing::error::PricingError;
use crate::pricing::{validate_price, PriceEstimator};

pub struct SpecialistEstimator {
    http: reqwest::Client,
    endpoint: String,
}

impl SpecialistEstimator {
    /// `endpoint` accepts `{"description": "..."}` and answers `{"price": 12.34}`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("bargain-scout/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Serialize)]
struct PriceRequest<'a> {
    description: &'a str,
}

#[derive(Deserialize)]
struct PriceResponse {
    price: f64,
}

#[async_trait]
impl PriceEstimator for SpecialistEstimator {
    async fn price(&self, text: &str) -> Result<f64, PricingError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&PriceRequest { description: text })
            .send()
            .await
            .map_err(|e| PricingError::service_unavailable("specialist", e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PricingError::service_unavailable(
                "specialist",
                format!("status {}", resp.status()),
            ));
        }

        let body: PriceResponse = resp
            .json()
            .await
            .map_err(|e| PricingError::estimation("specialist", e.to_string()))?;

        validate_price("specialist", body.price)
    }

    fn name(&self) -> &'static str {
        "specialist"
    }
}
