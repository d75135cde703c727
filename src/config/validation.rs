//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs
//! - Validate value ranges (timeouts > 0, batch sizes > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Only the running role's section is checked, plus shared sections

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{AppConfig, ServiceRole};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the configuration for the given role.
pub fn validate_config(config: &AppConfig, role: ServiceRole) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match role {
        ServiceRole::Edge => {
            check_socket_addr(&mut errors, "edge.bind_address", &config.edge.bind_address);
            // The forwarding client speaks plain HTTP only.
            check_url(&mut errors, "edge.resolution_url", &config.edge.resolution_url, &["http"]);
            check_not_blank(&mut errors, "edge.service_name", &config.edge.service_name);
        }
        ServiceRole::Resolution => {
            let resolution = &config.resolution;
            check_socket_addr(&mut errors, "resolution.bind_address", &resolution.bind_address);
            check_url(&mut errors, "resolution.directory_url", &resolution.directory_url, &["http", "https"]);
            check_url(&mut errors, "resolution.weather_url", &resolution.weather_url, &["http", "https"]);
            check_not_blank(&mut errors, "resolution.weather_api_key", &resolution.weather_api_key);
            check_not_blank(&mut errors, "resolution.service_name", &resolution.service_name);
        }
    }

    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not one of {}", observability.log_level, LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled {
        check_socket_addr(&mut errors, "observability.metrics_address", &observability.metrics_address);
    }

    let tracing = &observability.tracing;
    if tracing.enabled {
        check_url(&mut errors, "observability.tracing.endpoint", &tracing.endpoint, &["http", "https"]);
        if tracing.batch_size == 0 {
            errors.push(ValidationError::new("observability.tracing.batch_size", "must be greater than 0"));
        }
        if tracing.queue_capacity == 0 {
            errors.push(ValidationError::new("observability.tracing.queue_capacity", "must be greater than 0"));
        }
        if tracing.flush_interval_ms == 0 {
            errors.push(ValidationError::new("observability.tracing.flush_interval_ms", "must be greater than 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_socket_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if let Err(e) = value.parse::<SocketAddr>() {
        errors.push(ValidationError::new(field, format!("'{}' is not a socket address: {}", value, e)));
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, schemes: &[&str]) {
    match Url::parse(value) {
        Ok(url) if schemes.contains(&url.scheme()) && url.has_host() => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("'{}' must be an {} URL with a host", url, schemes.join("/")),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("'{}' is not a URL: {}", value, e))),
    }
}

fn check_not_blank(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.resolution.weather_api_key = "secret".to_string();
        config
    }

    #[test]
    fn defaults_are_valid_for_edge() {
        assert_eq!(validate_config(&AppConfig::default(), ServiceRole::Edge), Ok(()));
    }

    #[test]
    fn resolution_requires_weather_key() {
        let errors = validate_config(&AppConfig::default(), ServiceRole::Resolution).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "resolution.weather_api_key");

        assert_eq!(validate_config(&resolution_config(), ServiceRole::Resolution), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = resolution_config();
        config.resolution.bind_address = "not-an-address".to_string();
        config.resolution.directory_url = "ftp://example.com".to_string();
        config.timeouts.upstream_secs = 0;
        config.observability.log_level = "loud".to_string();
        config.observability.tracing.batch_size = 0;

        let errors = validate_config(&config, ServiceRole::Resolution).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "resolution.bind_address",
                "resolution.directory_url",
                "timeouts.upstream_secs",
                "observability.log_level",
                "observability.tracing.batch_size",
            ]
        );
    }

    #[test]
    fn edge_rejects_https_resolution_url() {
        let mut config = AppConfig::default();
        config.edge.resolution_url = "https://service_b:8081".to_string();
        let errors = validate_config(&config, ServiceRole::Edge).unwrap_err();
        assert_eq!(errors[0].field, "edge.resolution_url");
    }

    #[test]
    fn disabled_tracing_skips_exporter_checks() {
        let mut config = AppConfig::default();
        config.observability.tracing.enabled = false;
        config.observability.tracing.endpoint = String::new();
        assert_eq!(validate_config(&config, ServiceRole::Edge), Ok(()));
    }
}
