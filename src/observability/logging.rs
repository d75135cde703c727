//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber once per process
//! - Feed the same spans to the OpenTelemetry layer
//! - Pick the output format and log level from configuration
//!
//! # Design Decisions
//! - JSON format for production, pretty format for development
//! - `RUST_LOG` overrides the configured level

use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::config::{LogFormat, ObservabilityConfig};
use crate::error::StartupError;
use crate::observability::telemetry;

/// Default filter directives for a level, scoped to this crate and the HTTP middleware.
pub fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("cep_weather={level},tower_http={level},warn")
}

/// Install the global subscriber: log output plus span export through `provider`.
///
/// The level filter applies to log output only, so spans are exported and
/// propagated whatever the configured level.
pub fn init_logging(config: &ObservabilityConfig, provider: &SdkTracerProvider) -> Result<Dispatch, StartupError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let output: Box<dyn Layer<Registry> + Send + Sync> = match config.log_format {
        LogFormat::Json => fmt::layer().json().with_current_span(true).with_filter(filter).boxed(),
        LogFormat::Pretty => fmt::layer().with_filter(filter).boxed(),
    };
    let layers = vec![telemetry::span_layer::<Registry>(provider).boxed(), output];

    let dispatch = Dispatch::new(tracing_subscriber::registry().with(layers));
    tracing::dispatcher::set_global_default(dispatch.clone()).map_err(|e| StartupError::Logging(e.to_string()))?;
    Ok(dispatch)
}
