//! Error types for the request pipeline and process startup.
//!
//! Every pipeline failure is a [`ServiceError`]. The HTTP mapping lives in
//! `http::response`; nothing else produces client-visible text.

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// External dependency a pipeline stage talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Upstream {
    /// Resolution service, called by the edge service.
    Resolution,
    /// Postal directory, called by the resolution service.
    Directory,
    /// Weather API, called by the resolution service.
    Weather,
}

impl Upstream {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Upstream::Resolution => "resolution",
            Upstream::Directory => "directory",
            Upstream::Weather => "weather",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of one request, detected at the stage closest to its cause.
///
/// The display text is for logs only.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ServiceError {
    /// Body is not JSON, or not shaped like `{"cep": string}`.
    #[error("malformed request body: {0}")]
    MalformedInput(String),

    /// `cep` is not exactly 8 ASCII digits.
    #[error("'{0}' is not an 8-digit CEP")]
    InvalidFormat(String),

    /// The upstream answered that the resource does not exist.
    #[error("{0} did not find the requested CEP")]
    UpstreamNotFound(Upstream),

    /// The upstream could not be reached or did not answer in time.
    #[error("{upstream} unavailable: {reason}")]
    UpstreamUnavailable { upstream: Upstream, reason: String },

    /// The upstream answered with a payload that does not have the agreed shape.
    #[error("{upstream} broke its data contract: {reason}")]
    UpstreamDataContractViolation { upstream: Upstream, reason: String },
}

impl ServiceError {
    /// `upstream` could not be reached or did not answer usefully.
    pub fn unavailable(upstream: Upstream, reason: impl fmt::Display) -> Self {
        ServiceError::UpstreamUnavailable {
            upstream,
            reason: reason.to_string(),
        }
    }

    /// `upstream` answered, but not in the agreed shape.
    pub fn contract_violation(upstream: Upstream, reason: impl fmt::Display) -> Self {
        ServiceError::UpstreamDataContractViolation {
            upstream,
            reason: reason.to_string(),
        }
    }

    /// Upstream involved in the failure, if any.
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            ServiceError::MalformedInput(_) | ServiceError::InvalidFormat(_) => None,
            ServiceError::UpstreamNotFound(upstream)
            | ServiceError::UpstreamUnavailable { upstream, .. }
            | ServiceError::UpstreamDataContractViolation { upstream, .. } => Some(*upstream),
        }
    }

    /// Status code the client sees for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidFormat(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::UpstreamNotFound(_) => StatusCode::NOT_FOUND,
            // A directory that cannot be reached is reported like an unknown code.
            ServiceError::UpstreamUnavailable {
                upstream: Upstream::Directory,
                ..
            } => StatusCode::NOT_FOUND,
            ServiceError::UpstreamUnavailable { .. } | ServiceError::UpstreamDataContractViolation { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Errors that stop a service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid upstream URL '{url}': {reason}")]
    UpstreamUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("failed to initialise span export: {0}")]
    Tracing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
