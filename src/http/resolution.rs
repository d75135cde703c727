//! Resolution service: `POST /weather`.
//!
//! # Data Flow
//! ```text
//! {"cep"} → directory lookup (city) → weather lookup (°C) → convert → JSON
//! ```

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{Instrument, Span};

use crate::config::AppConfig;
use crate::domain::{CepRequest, PostalCode, WeatherResult};
use crate::error::{ServiceError, StartupError, Upstream};
use crate::http::server;
use crate::observability::{metrics, Telemetry};
use crate::upstream::{self, DirectoryClient, WeatherClient};

/// Handler state.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    pub directory: DirectoryClient,
    pub weather: WeatherClient,
}

/// The resolution HTTP service.
pub struct ResolutionServer {
    router: Router,
    service_name: String,
}

impl ResolutionServer {
    pub fn new(config: &AppConfig, telemetry: Telemetry) -> Result<Self, StartupError> {
        let client = upstream::http_client(Duration::from_secs(config.timeouts.upstream_secs))?;
        Ok(Self::with_client(config, telemetry, client))
    }

    /// Build the service around an existing upstream HTTP client.
    pub fn with_client(config: &AppConfig, telemetry: Telemetry, client: reqwest::Client) -> Self {
        let resolution = &config.resolution;
        let state = ResolutionState {
            directory: DirectoryClient::new(client.clone(), &resolution.directory_url),
            weather: WeatherClient::new(client, &resolution.weather_url, &resolution.weather_api_key),
        };
        Self {
            router: router(state, &telemetry),
            service_name: telemetry.service_name().to_string(),
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        server::serve(self.router, listener, &self.service_name, shutdown).await
    }
}

pub fn router(state: ResolutionState, telemetry: &Telemetry) -> Router {
    server::with_common_layers(
        Router::new()
            .route("/weather", post(handle_weather))
            .with_state(state),
        "POST /weather",
        telemetry,
    )
}

async fn handle_weather(State(state): State<ResolutionState>, body: Bytes) -> Response {
    let started = Instant::now();
    let response = match resolve(&state, &body).await {
        Ok(result) => {
            tracing::info!(city = %result.city, temp_c = result.temp_c, "Resolved temperature");
            Json(result).into_response()
        }
        Err(e) => {
            server::log_failure(&e);
            e.into_response()
        }
    };
    metrics::record_request("resolution", response.status().as_u16(), started);
    response
}

async fn resolve(state: &ResolutionState, body: &[u8]) -> Result<WeatherResult, ServiceError> {
    let request = CepRequest::from_body(body)?;
    let raw = request.cep.as_deref().unwrap_or_default();
    // No directory entry can exist for a malformed code.
    let cep = PostalCode::parse(raw).map_err(|_| {
        tracing::debug!(cep = %raw, "Not a CEP, skipping directory lookup");
        ServiceError::UpstreamNotFound(Upstream::Directory)
    })?;
    Span::current().record("cep", cep.as_str());

    let lookup = server::client_span("lookup-city");
    lookup.record("cep", cep.as_str());
    let city = state.directory.lookup_city(&cep).instrument(lookup.clone()).await;
    server::record_outcome(&lookup, &city);
    let city = city?;
    Span::current().record("city", city.as_str());

    let fetch = server::client_span("fetch-temperature");
    fetch.record("city", city.as_str());
    let celsius = state.weather.current_celsius(&city).instrument(fetch.clone()).await;
    server::record_outcome(&fetch, &celsius);

    Ok(WeatherResult::from_celsius(city, celsius?))
}
