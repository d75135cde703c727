//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers produce:
//!     → logging.rs (structured log events inside the request span)
//!     → metrics.rs (counters, histograms)
//!     → telemetry.rs (the same spans, bridged to OpenTelemetry)
//!
//! Across the network:
//!     → propagation.rs (context ↔ carrier ↔ traceparent header)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape (optional)
//!     → Zipkin (batched span export)
//! ```

pub mod logging;
pub mod metrics;
pub mod propagation;
pub mod telemetry;

pub use propagation::{Carrier, TRACEPARENT};
pub use telemetry::Telemetry;
