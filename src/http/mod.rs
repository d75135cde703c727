//! HTTP services.
//!
//! # Data Flow
//! ```text
//! client
//!     → edge.rs        POST /cep      (validate, forward, relay)
//!     → resolution.rs  POST /weather  (directory, weather, convert)
//!
//! server.rs    shared middleware, server and client spans, serve loop
//! request.rs   request id
//! response.rs  error → status/body, relay
//! ```

pub mod edge;
pub mod request;
pub mod resolution;
pub mod response;
pub mod server;

pub use edge::{EdgeServer, EdgeState};
pub use request::X_REQUEST_ID;
pub use resolution::{ResolutionServer, ResolutionState};
