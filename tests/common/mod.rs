//! Shared utilities for integration tests: stub upstreams and service launchers.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use cep_weather::config::AppConfig;
use cep_weather::http::{EdgeServer, ResolutionServer};
use cep_weather::observability::{telemetry, Telemetry};
use opentelemetry_sdk::trace::{InMemorySpanExporter, SpanData};
use serde_json::Value;
use tokio::net::TcpListener;

pub const WEATHER_KEY: &str = "test-key";

/// Canned answer of a stub upstream.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "text/plain; charset=utf-8",
            body: body.to_string(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// A request seen by a stub.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri.query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// A running stub upstream that records every request.
#[derive(Debug, Clone)]
pub struct Stub {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Stub {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `router` on an ephemeral loopback port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Start a stub answering every request on `path` with `reply`.
pub async fn start_stub(path: &str, reply: Reply) -> Stub {
    let requests: Arc<Mutex<Vec<Recorded>>> = Arc::default();
    let recorder = requests.clone();
    let router = Router::new().route(
        path,
        any(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let recorder = recorder.clone();
            let reply = reply.clone();
            async move {
                recorder.lock().unwrap().push(Recorded { uri, headers, body });
                reply
            }
        }),
    );
    let addr = spawn_router(router).await;
    Stub { addr, requests }
}

/// Postal directory stub.
pub async fn start_directory(reply: Reply) -> Stub {
    start_stub("/ws/{cep}/json/", reply).await
}

/// Directory stub that knows one city.
pub async fn start_directory_with_city(city: &str) -> Stub {
    start_directory(Reply::json(200, serde_json::json!({ "localidade": city, "uf": "SP" }))).await
}

/// Weather API stub.
pub async fn start_weather(reply: Reply) -> Stub {
    start_stub("/current.json", reply).await
}

/// Weather stub reporting `temp_c`.
pub async fn start_weather_with_temp(temp_c: f64) -> Stub {
    start_weather(Reply::json(200, serde_json::json!({ "current": { "temp_c": temp_c } }))).await
}

/// Resolution service stub, as seen by the edge service.
pub async fn start_resolution_stub(reply: Reply) -> Stub {
    start_stub("/weather", reply).await
}

/// Client that never goes through a proxy from the environment.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A loopback address nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Telemetry recording finished spans in memory.
pub fn in_memory_telemetry(service: &str) -> (Telemetry, InMemorySpanExporter) {
    let exporter = InMemorySpanExporter::default();
    let provider = telemetry::provider_builder(service)
        .with_simple_exporter(exporter.clone())
        .build();
    (Telemetry::with_provider(service, &provider), exporter)
}

/// Finished spans called `name`.
pub fn spans_named(exporter: &InMemorySpanExporter, name: &str) -> Vec<SpanData> {
    exporter
        .get_finished_spans()
        .unwrap()
        .into_iter()
        .filter(|span| span.name == name)
        .collect()
}

/// Wait for the span called `name` to finish. Server spans end once the
/// response body is flushed, which can be after the client has read it.
pub async fn finished_span(exporter: &InMemorySpanExporter, name: &str) -> SpanData {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if let Some(span) = spans_named(exporter, name).into_iter().next() {
            return span;
        }
        assert!(Instant::now() < deadline, "span {name} never finished");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Attribute `key` of `span`, rendered as text.
pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.to_string())
}

/// Start the resolution service against the given directory and weather URLs.
pub async fn start_resolution(directory_url: &str, weather_url: &str) -> (SocketAddr, InMemorySpanExporter) {
    let mut config = AppConfig::default();
    config.resolution.directory_url = directory_url.to_string();
    config.resolution.weather_url = weather_url.to_string();
    config.resolution.weather_api_key = WEATHER_KEY.to_string();

    let (telemetry, exporter) = in_memory_telemetry(&config.resolution.service_name);
    let server = ResolutionServer::with_client(&config, telemetry, client());
    (spawn_router(server.router()).await, exporter)
}

/// Start the edge service forwarding to `resolution_url`.
pub async fn start_edge(resolution_url: &str) -> (SocketAddr, InMemorySpanExporter) {
    let mut config = AppConfig::default();
    config.edge.resolution_url = resolution_url.to_string();
    config.timeouts.upstream_secs = 5;

    let (telemetry, exporter) = in_memory_telemetry(&config.edge.service_name);
    let server = EdgeServer::new(&config, telemetry).unwrap();
    (spawn_router(server.router()).await, exporter)
}

/// POST a raw body and return status, content type and body text.
pub async fn post(url: String, body: &str, traceparent: Option<&str>) -> (StatusCode, Option<String>, String) {
    let mut request = client()
        .post(url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.to_string());
    if let Some(traceparent) = traceparent {
        request = request.header("traceparent", traceparent);
    }
    let response = request.send().await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    (status, content_type, response.text().await.unwrap())
}
