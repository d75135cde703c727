//! Outbound HTTP clients.
//!
//! # Data Flow
//! ```text
//! Edge service:
//!     resolution.rs  POST /weather      → relayed status + body
//!
//! Resolution service:
//!     directory.rs   GET /ws/<cep>/json/ → city
//!     weather.rs     GET /current.json   → °C
//! ```
//!
//! # Design Decisions
//! - Only the resolution service call carries `traceparent`; third parties get none
//! - Clients return `ServiceError` tagged with the upstream they talk to
//! - Outcomes are counted per upstream in `observability::metrics`

pub mod directory;
pub mod resolution;
pub mod weather;

use std::time::Duration;

pub use directory::DirectoryClient;
pub use resolution::{Relayed, ResolutionClient};
pub use weather::WeatherClient;

/// Shared client for the resolution service's upstreams.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}
