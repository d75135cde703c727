//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, ServiceRole};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `resolution.weather_api_key`.
pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
/// Environment variable overriding `edge.resolution_url`.
pub const ENV_RESOLUTION_URL: &str = "RESOLUTION_URL";
/// Environment variable overriding `observability.tracing.endpoint`.
pub const ENV_ZIPKIN_ENDPOINT: &str = "ZIPKIN_ENDPOINT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read configuration from an optional TOML file and apply environment overrides.
///
/// Without a path every field takes its default.
pub fn read_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Read configuration for `role`, apply the command-line bind address, then validate.
pub fn load_config(path: Option<&Path>, role: ServiceRole, bind: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut config = read_config(path)?;
    if let Some(bind) = bind {
        match role {
            ServiceRole::Edge => config.edge.bind_address = bind.to_string(),
            ServiceRole::Resolution => config.resolution.bind_address = bind.to_string(),
        }
    }
    validate_config(&config, role).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides from `lookup` (the process environment in production).
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(ENV_WEATHER_API_KEY) {
        config.resolution.weather_api_key = key;
    }
    if let Some(url) = lookup(ENV_RESOLUTION_URL) {
        config.edge.resolution_url = url;
    }
    if let Some(endpoint) = lookup(ENV_ZIPKIN_ENDPOINT) {
        config.observability.tracing.endpoint = endpoint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [resolution]
            weather_api_key = "abc"

            [observability]
            log_format = "json"

            [observability.tracing]
            batch_size = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.resolution.weather_api_key, "abc");
        assert_eq!(config.resolution.bind_address, "0.0.0.0:8081");
        assert_eq!(config.edge.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.tracing.batch_size, 8);
        assert!(config.observability.tracing.enabled);
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| match key {
            ENV_WEATHER_API_KEY => Some("from-env".to_string()),
            ENV_RESOLUTION_URL => Some("http://127.0.0.1:9999".to_string()),
            _ => None,
        });

        assert_eq!(config.resolution.weather_api_key, "from-env");
        assert_eq!(config.edge.resolution_url, "http://127.0.0.1:9999");
        assert_eq!(config.observability.tracing.endpoint, "http://zipkin:9411/api/v2/spans");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let path = std::env::temp_dir().join(format!("cep-weather-bad-{}.toml", std::process::id()));
        fs::write(&path, "[edge\nbind_address = ").unwrap();
        let err = read_config(Some(&path)).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!("cep-weather-invalid-{}.toml", std::process::id()));
        fs::write(&path, "[edge]\nbind_address = \"nowhere\"\n").unwrap();
        let err = load_config(Some(&path), ServiceRole::Edge, None).unwrap_err();
        let _ = fs::remove_file(&path);

        match err {
            ConfigError::Validation(errors) => assert!(errors.iter().any(|e| e.field == "edge.bind_address")),
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn bind_override_applies_to_the_role_before_validation() {
        let config = load_config(None, ServiceRole::Resolution, Some("127.0.0.1:9191")).unwrap();
        assert_eq!(config.resolution.bind_address, "127.0.0.1:9191");
        assert_eq!(config.edge.bind_address, "0.0.0.0:8080");

        let err = load_config(None, ServiceRole::Edge, Some("nowhere")).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert!(errors.iter().any(|e| e.field == "edge.bind_address")),
            other => panic!("expected validation error, got {other}"),
        }
    }
}
