//! Edge service: `POST /cep`.
//!
//! Validates the CEP and forwards it to the resolution service, relaying the
//! answer. Invalid input never leaves this process.

use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{Instrument, Span};

use crate::config::AppConfig;
use crate::domain::CepRequest;
use crate::error::StartupError;
use crate::http::{response, server};
use crate::observability::{metrics, Telemetry};
use crate::upstream::ResolutionClient;

/// Handler state.
#[derive(Debug, Clone)]
pub struct EdgeState {
    pub resolution: ResolutionClient,
    pub telemetry: Telemetry,
}

/// The edge HTTP service.
pub struct EdgeServer {
    router: Router,
    service_name: String,
}

impl EdgeServer {
    pub fn new(config: &AppConfig, telemetry: Telemetry) -> Result<Self, StartupError> {
        let timeout = Duration::from_secs(config.timeouts.upstream_secs);
        let resolution = ResolutionClient::new(&config.edge.resolution_url, timeout)?;
        tracing::debug!(endpoint = %resolution.endpoint(), "Forwarding to resolution service");
        Ok(Self::with_state(EdgeState { resolution, telemetry }))
    }

    pub fn with_state(state: EdgeState) -> Self {
        let service_name = state.telemetry.service_name().to_string();
        Self {
            router: router(state),
            service_name,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        server::serve(self.router, listener, &self.service_name, shutdown).await
    }
}

pub fn router(state: EdgeState) -> Router {
    let telemetry = state.telemetry.clone();
    server::with_common_layers(
        Router::new().route("/cep", post(handle_cep)).with_state(state),
        "POST /cep",
        &telemetry,
    )
}

async fn handle_cep(State(state): State<EdgeState>, body: Bytes) -> Response {
    let started = Instant::now();
    let response = forward(&state, &body).await;
    metrics::record_request("edge", response.status().as_u16(), started);
    response
}

async fn forward(state: &EdgeState, body: &[u8]) -> Response {
    let cep = match CepRequest::parse_postal_code(body) {
        Ok(cep) => cep,
        Err(e) => {
            server::log_failure(&e);
            return e.into_response();
        }
    };
    Span::current().record("cep", cep.as_str());

    let call = server::client_span("forward-to-resolution");
    call.record("http.url", tracing::field::display(state.resolution.endpoint()));
    let carrier = state.telemetry.carrier(&call);

    let result = state.resolution.forward(&cep, &carrier).instrument(call.clone()).await;
    server::record_outcome(&call, &result);
    match result {
        Ok(relayed) => {
            call.record("http.status_code", relayed.status.as_u16());
            tracing::info!(cep = %cep, status = %relayed.status, "Relayed resolution answer");
            response::relay(relayed)
        }
        Err(e) => {
            server::log_failure(&e);
            e.into_response()
        }
    }
}
