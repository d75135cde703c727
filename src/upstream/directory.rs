//! Postal directory client: CEP → city name.
//!
//! `GET <base>/ws/<cep>/json/` answers a JSON object with `localidade` (the city)
//! or with a truthy `erro` for unknown codes. The directory is a third party:
//! requests carry no trace context.

use serde_json::{Map, Value};

use crate::domain::PostalCode;
use crate::error::{ServiceError, Upstream};
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// `base_url` is the directory root, e.g. `https://viacep.com.br`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Lookup URL for `cep`. The directory requires the trailing slash.
    pub fn lookup_url(&self, cep: &PostalCode) -> String {
        format!("{}/ws/{}/json/", self.base_url, cep)
    }

    /// Resolve a postal code to its city.
    pub async fn lookup_city(&self, cep: &PostalCode) -> Result<String, ServiceError> {
        let result = self.fetch(cep).await;
        metrics::record_upstream(Upstream::Directory, &result);
        result
    }

    async fn fetch(&self, cep: &PostalCode) -> Result<String, ServiceError> {
        let response = self
            .client
            .get(self.lookup_url(cep))
            .send()
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Directory, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(cep = %cep, status = %status, "Directory rejected lookup");
            return Err(ServiceError::UpstreamNotFound(Upstream::Directory));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Directory, e))?;
        city_from_payload(&body)
    }
}

/// Extract the city from a directory response body.
pub fn city_from_payload(body: &[u8]) -> Result<String, ServiceError> {
    let payload: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| ServiceError::contract_violation(Upstream::Directory, format!("body is not a JSON object: {e}")))?;

    if payload.get("erro").is_some_and(is_truthy) {
        return Err(ServiceError::UpstreamNotFound(Upstream::Directory));
    }

    match payload.get("localidade") {
        Some(Value::String(city)) if !city.trim().is_empty() => Ok(city.clone()),
        Some(Value::String(_)) => Err(ServiceError::contract_violation(
            Upstream::Directory,
            "'localidade' is empty",
        )),
        Some(other) => Err(ServiceError::contract_violation(
            Upstream::Directory,
            format!("'localidade' is not a string: {other}"),
        )),
        None => Err(ServiceError::contract_violation(Upstream::Directory, "'localidade' is missing")),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        Value::Array(_) | Value::Object(_) => true,
    }
}
