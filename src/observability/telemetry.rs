//! Distributed tracing.
//!
//! # Responsibilities
//! - Build the OpenTelemetry tracer provider, exporting to Zipkin in batches
//! - Bridge `tracing` spans into it through `tracing-opentelemetry`
//! - Carry the W3C propagator and the span dispatcher into handler state
//!
//! # Design Decisions
//! - Nothing is registered globally: each service's [`Telemetry`] scopes its
//!   requests to its own dispatcher, so two services in one process keep
//!   separate providers
//! - Disabled export still builds a provider, so ids are minted and context
//!   keeps flowing to the next hop

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use opentelemetry::trace::{TraceContextExt, TraceId, TracerProvider as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{
    BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider, TracerProviderBuilder,
};
use opentelemetry_sdk::Resource;
use opentelemetry_zipkin::ZipkinExporter;
use tracing::{Dispatch, Subscriber};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, Registry};

use crate::config::TracingConfig;
use crate::error::StartupError;
use crate::observability::propagation::Carrier;

/// Instrumentation scope of every span this crate starts.
pub const INSTRUMENTATION_SCOPE: &str = "cep-weather";

/// Resource identifying `service_name` in exported spans.
pub fn resource(service_name: &str) -> Resource {
    Resource::builder_empty()
        .with_attributes([KeyValue::new("service.name", service_name.to_string())])
        .build()
}

/// Provider builder with the sampler and resource every service uses.
///
/// Spans follow the caller's sampling decision; new traces are always sampled.
pub fn provider_builder(service_name: &str) -> TracerProviderBuilder {
    SdkTracerProvider::builder()
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::AlwaysOn)))
        .with_resource(resource(service_name))
}

/// Tracer provider for `service_name`, exporting to Zipkin when enabled.
pub fn tracer_provider(service_name: &str, config: &TracingConfig) -> Result<SdkTracerProvider, StartupError> {
    let builder = provider_builder(service_name);
    if !config.enabled {
        tracing::debug!(service = %service_name, "Span export disabled");
        return Ok(builder.build());
    }

    let exporter = ZipkinExporter::builder()
        .with_collector_endpoint(config.endpoint.as_str())
        .build()
        .map_err(|e| StartupError::Tracing(e.to_string()))?;
    let batch = BatchConfigBuilder::default()
        .with_max_queue_size(config.queue_capacity)
        .with_max_export_batch_size(config.batch_size)
        .with_scheduled_delay(Duration::from_millis(config.flush_interval_ms))
        .build();
    let processor = BatchSpanProcessor::builder(exporter).with_batch_config(batch).build();

    Ok(builder.with_span_processor(processor).build())
}

/// Layer turning this crate's `info` spans into OpenTelemetry spans.
pub fn span_layer<S>(provider: &SdkTracerProvider) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync + 'static,
{
    tracing_opentelemetry::layer()
        .with_tracer(provider.tracer(INSTRUMENTATION_SCOPE))
        .with_filter(Targets::new().with_target("cep_weather", tracing::Level::INFO))
}

/// Trace id of a `tracing` span, as exported.
pub fn trace_id(span: &tracing::Span) -> TraceId {
    span.context().span().span_context().trace_id()
}

/// Tracing handle injected into each service.
#[derive(Clone)]
pub struct Telemetry {
    service_name: Arc<str>,
    dispatch: Dispatch,
    propagator: TraceContextPropagator,
}

impl Telemetry {
    /// `dispatch` must include a [`span_layer`].
    pub fn new(service_name: &str, dispatch: Dispatch) -> Self {
        Self {
            service_name: Arc::from(service_name),
            dispatch,
            propagator: TraceContextPropagator::new(),
        }
    }

    /// Spans only, no log output.
    pub fn with_provider(service_name: &str, provider: &SdkTracerProvider) -> Self {
        let subscriber = tracing_subscriber::registry().with(span_layer::<Registry>(provider));
        Self::new(service_name, Dispatch::new(subscriber))
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Dispatcher every request of this service runs under.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Parent context sent by the caller. Without a usable `traceparent` the
    /// request starts a new trace.
    pub fn extract(&self, headers: &HeaderMap) -> Context {
        Carrier::from_headers(&self.propagator, headers).extract(&self.propagator)
    }

    /// Propagation fields placing the next hop under `span`.
    pub fn carrier(&self, span: &tracing::Span) -> Carrier {
        Carrier::inject(&self.propagator, &span.context())
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("service_name", &self.service_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SpanData};

    /// Telemetry recording finished spans in memory.
    pub fn in_memory(service_name: &str) -> (Telemetry, InMemorySpanExporter) {
        let exporter = InMemorySpanExporter::default();
        let provider = provider_builder(service_name)
            .with_simple_exporter(exporter.clone())
            .build();
        (Telemetry::with_provider(service_name, &provider), exporter)
    }

    /// Finished spans called `name`.
    pub fn named(exporter: &InMemorySpanExporter, name: &str) -> Vec<SpanData> {
        exporter
            .get_finished_spans()
            .unwrap_or_default()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }

    /// Attribute `key` of `span`, rendered as text.
    pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
        span.attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| kv.value.to_string())
    }
}
