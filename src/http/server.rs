//! Shared HTTP server plumbing for both services.
//!
//! # Responsibilities
//! - Wrap a service router in the common middleware stack
//! - Open the server span of each request under the caller's trace
//! - Serve the router on a listener until shutdown is signalled
//! - Record outcomes on spans and log failed requests the same way everywhere
//!
//! # Design Decisions
//! - Request ids are assigned before tracing so every span carries one
//! - The `TraceLayer` span is the exported server span
//! - Graceful shutdown lets in-flight requests finish

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::field::{display, Empty};
use tracing::instrument::WithSubscriber;
use tracing::Span;
use tracing_opentelemetry::OpenTelemetrySpanExt;

use crate::error::ServiceError;
use crate::http::request::request_id;
use crate::observability::{telemetry, Telemetry};

/// Apply the middleware every service shares. `route` names the server span.
pub fn with_common_layers(router: Router, route: &'static str, telemetry: &Telemetry) -> Router {
    let inbound = telemetry.clone();
    let trace = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request| server_span(route, &inbound, request))
        .on_response(|response: &Response, _latency: Duration, span: &Span| {
            record_status(span, response.status());
        });

    router
        .layer(trace)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn_with_state(telemetry.clone(), scope_to_service))
}

/// Run the request under the service's own span dispatcher.
async fn scope_to_service(State(telemetry): State<Telemetry>, request: Request, next: Next) -> Response {
    let dispatch = telemetry.dispatch().clone();
    next.run(request).with_subscriber(dispatch).await
}

fn server_span(route: &'static str, telemetry: &Telemetry, request: &Request) -> Span {
    let span = tracing::info_span!(
        "request",
        otel.name = route,
        otel.kind = "server",
        otel.status_code = Empty,
        http.method = %request.method(),
        http.status_code = Empty,
        request_id = %request_id(request.headers()),
        trace_id = Empty,
        cep = Empty,
        city = Empty
    );
    let _ = span.set_parent(telemetry.extract(request.headers()));
    span.record("trace_id", display(telemetry::trace_id(&span)));
    span
}

fn record_status(span: &Span, status: StatusCode) {
    span.record("http.status_code", status.as_u16());
    if status.is_server_error() {
        span.record("otel.status_code", "error");
    }
}

/// Span of an outbound call, a child of the current request span.
pub fn client_span(name: &'static str) -> Span {
    tracing::info_span!(
        "call",
        otel.name = name,
        otel.kind = "client",
        otel.status_code = Empty,
        otel.status_message = Empty,
        http.url = Empty,
        http.status_code = Empty,
        cep = Empty,
        city = Empty
    )
}

/// Mark a client span as failed when its call failed.
pub fn record_outcome<T>(span: &Span, result: &Result<T, ServiceError>) {
    if let Err(e) = result {
        span.record("otel.status_code", "error");
        span.record("otel.status_message", display(e));
    }
}

/// Serve `router` until a shutdown message arrives.
pub async fn serve(
    router: Router,
    listener: TcpListener,
    service: &str,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(service = %service, address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!(service = %service, "HTTP server stopped");
    Ok(())
}

/// Log a request that ended in an error response.
pub fn log_failure(error: &ServiceError) {
    let status = error.status();
    let upstream = error.upstream().map(|u| u.as_str()).unwrap_or("none");
    if status.is_server_error() {
        tracing::warn!(error = %error, upstream = %upstream, status = %status, "Request failed");
    } else {
        tracing::info!(error = %error, upstream = %upstream, status = %status, "Request rejected");
    }
}
