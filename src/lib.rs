//! CEP → city → temperature services.
//!
//! Two HTTP services share this library: the edge service validates postal
//! codes and forwards them, the resolution service looks up the city and its
//! current temperature. Both propagate W3C trace context and export spans.

pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod upstream;

pub use config::{AppConfig, ServiceRole};
pub use error::{ServiceError, StartupError};
pub use http::{EdgeServer, ResolutionServer};
pub use lifecycle::Shutdown;
