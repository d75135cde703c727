//! Edge → resolution service forwarding.
//!
//! The edge service does not interpret the resolution service's answer: status,
//! content type and body are buffered and handed back unchanged. Only a failed
//! exchange (connect error, broken body, timeout) becomes an error here.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::domain::{CepPayload, PostalCode};
use crate::error::{ServiceError, StartupError, Upstream};
use crate::observability::{metrics, Carrier};

/// Largest resolution response the edge service buffers.
const MAX_RELAY_BODY: usize = 1024 * 1024;

/// Resolution service answer, relayed to the edge caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct ResolutionClient {
    client: Client<HttpConnector, Body>,
    endpoint: Uri,
    timeout: Duration,
}

impl ResolutionClient {
    /// `base_url` is the resolution service root, e.g. `http://service_b:8081`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StartupError> {
        let endpoint = format!("{}/weather", base_url.trim_end_matches('/'));
        let endpoint: Uri = endpoint.parse().map_err(|e: axum::http::uri::InvalidUri| StartupError::UpstreamUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if endpoint.scheme_str() != Some("http") || endpoint.authority().is_none() {
            return Err(StartupError::UpstreamUrl {
                url: base_url.to_string(),
                reason: "expected an absolute http:// URL".to_string(),
            });
        }

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    /// `POST /weather` on the resolution service.
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// POST `{"cep": ...}` to the resolution service, sending `carrier` as headers.
    pub async fn forward(&self, cep: &PostalCode, carrier: &Carrier) -> Result<Relayed, ServiceError> {
        let result = match tokio::time::timeout(self.timeout, self.exchange(cep, carrier)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::unavailable(
                Upstream::Resolution,
                format!("no answer within {:?}", self.timeout),
            )),
        };
        metrics::record_upstream(Upstream::Resolution, &result);
        result
    }

    async fn exchange(&self, cep: &PostalCode, carrier: &Carrier) -> Result<Relayed, ServiceError> {
        let payload = serde_json::to_vec(&CepPayload::from(cep))
            .map_err(|e| ServiceError::unavailable(Upstream::Resolution, e))?;

        let mut request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .map_err(|e| ServiceError::unavailable(Upstream::Resolution, e))?;
        carrier.write_headers(request.headers_mut());

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Resolution, e))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), MAX_RELAY_BODY)
            .await
            .map_err(|e| ServiceError::unavailable(Upstream::Resolution, e))?;

        Ok(Relayed {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body,
        })
    }
}
