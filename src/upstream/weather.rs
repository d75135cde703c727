//! Weather API client: city → current temperature in Celsius.
//!
//! The weather API is a third party: requests carry no trace context.

use serde_json::Value;

use crate::error::{ServiceError, Upstream};
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// `base_url` is the API root, e.g. `http://api.weatherapi.com/v1`.
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Current-conditions endpoint; key and city go in the query.
    pub fn current_url(&self) -> String {
        format!("{}/current.json", self.base_url)
    }

    /// Current temperature of `city`, in Celsius.
    pub async fn current_celsius(&self, city: &str) -> Result<f64, ServiceError> {
        let result = self.fetch(city).await;
        metrics::record_upstream(Upstream::Weather, &result);
        result
    }

    async fn fetch(&self, city: &str) -> Result<f64, ServiceError> {
        let response = self
            .client
            .get(self.current_url())
            .query(&[("key", self.api_key.as_str()), ("q", city)])
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Weather, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::unavailable(Upstream::Weather, format!("answered {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Weather, e))?;
        celsius_from_payload(&body)
    }
}

/// Extract `current.temp_c` from a weather API response body.
pub fn celsius_from_payload(body: &[u8]) -> Result<f64, ServiceError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::contract_violation(Upstream::Weather, format!("body is not JSON: {e}")))?;

    let current = payload
        .get("current")
        .ok_or_else(|| ServiceError::contract_violation(Upstream::Weather, "'current' is missing"))?;

    match current.get("temp_c") {
        Some(value) => value.as_f64().ok_or_else(|| {
            ServiceError::contract_violation(Upstream::Weather, format!("'current.temp_c' is not a number: {value}"))
        }),
        None => Err(ServiceError::contract_violation(
            Upstream::Weather,
            "'current.temp_c' is missing",
        )),
    }
}
