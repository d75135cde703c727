//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both services.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Which of the two services a process runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    /// Client-facing `POST /cep`.
    Edge,
    /// Inter-service `POST /weather`.
    Resolution,
}

/// Root configuration shared by both services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Edge service settings.
    pub edge: EdgeConfig,

    /// Resolution service settings.
    pub resolution: ResolutionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Bind address for the given role.
    pub fn bind_address(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Edge => &self.edge.bind_address,
            ServiceRole::Resolution => &self.resolution.bind_address,
        }
    }

    /// Service name the role tags its spans with.
    pub fn service_name(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Edge => &self.edge.service_name,
            ServiceRole::Resolution => &self.resolution.service_name,
        }
    }
}

/// Edge service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Base URL of the resolution service (plain HTTP).
    pub resolution_url: String,

    /// Service name attached to exported spans.
    pub service_name: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            resolution_url: "http://service_b:8081".to_string(),
            service_name: "edge-service".to_string(),
        }
    }
}

/// Resolution service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,

    /// Base URL of the postal directory; lookups go to `<base>/ws/<cep>/json/`.
    pub directory_url: String,

    /// Base URL of the weather API; lookups go to `<base>/current.json`.
    pub weather_url: String,

    /// Weather API key, sent as the `key` query parameter.
    pub weather_api_key: String,

    /// Service name attached to exported spans.
    pub service_name: String,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
            directory_url: "https://viacep.com.br".to_string(),
            weather_url: "http://api.weatherapi.com/v1".to_string(),
            weather_api_key: String::new(),
            service_name: "resolution-service".to_string(),
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for one upstream exchange (connect, send, read body) in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_secs: 10 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Distributed tracing export.
    pub tracing: TracingConfig,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
            tracing: TracingConfig::default(),
        }
    }
}

/// Span export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Export spans. Context is propagated either way.
    pub enabled: bool,

    /// Zipkin v2 span ingestion endpoint.
    pub endpoint: String,

    /// Spans per export request.
    pub batch_size: usize,

    /// Maximum time a finished span waits before export, in milliseconds.
    pub flush_interval_ms: u64,

    /// Finished spans buffered ahead of the exporter; overflow is dropped.
    pub queue_capacity: usize,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://zipkin:9411/api/v2/spans".to_string(),
            batch_size: 64,
            flush_interval_ms: 1000,
            queue_capacity: 2048,
        }
    }
}
