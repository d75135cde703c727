//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks for the running role)
//!     → AppConfig (validated, immutable)
//!     → read once at startup by the chosen service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, read_config, ConfigError};
pub use schema::{
    AppConfig, EdgeConfig, LogFormat, ObservabilityConfig, ResolutionConfig, ServiceRole, TimeoutConfig,
    TracingConfig,
};
pub use validation::{validate_config, ValidationError};
