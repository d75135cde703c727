//! W3C trace context across process boundaries.
//!
//! A [`Carrier`] is the ordered string map the propagator reads from and writes
//! to. HTTP headers are copied in and out of it, so the handlers and clients
//! never touch the propagator's header names directly.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::TraceContextPropagator;

/// Header carrying the W3C trace context.
pub const TRACEPARENT: &str = "traceparent";

/// Propagation fields of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Carrier(BTreeMap<String, String>);

impl Carrier {
    /// Fields describing `cx`, as the propagator writes them.
    pub fn inject(propagator: &TraceContextPropagator, cx: &Context) -> Self {
        let mut carrier = Self::default();
        propagator.inject_context(cx, &mut carrier);
        carrier
    }

    /// Context described by the fields. Absent or malformed fields give a
    /// context without a remote parent.
    pub fn extract(&self, propagator: &TraceContextPropagator) -> Context {
        propagator.extract(self)
    }

    /// Copy the propagator's fields out of request headers.
    pub fn from_headers(propagator: &TraceContextPropagator, headers: &HeaderMap) -> Self {
        let fields = propagator
            .fields()
            .filter_map(|name| {
                let value = headers.get(name)?.to_str().ok()?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self(fields)
    }

    /// Write every non-empty field into `headers`, replacing existing values.
    pub fn write_headers(&self, headers: &mut HeaderMap) {
        for (key, value) in self.iter().filter(|(_, v)| !v.is_empty()) {
            if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(key.as_bytes()), HeaderValue::from_str(value)) {
                headers.insert(name, value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Injector for Carrier {
    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_ascii_lowercase(), value);
    }
}

impl Extractor for Carrier {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }
}
