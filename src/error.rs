use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors are fatal: the synthesis pass stops before any
/// descriptor is handed on.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate environment name '{name}' in registry")]
    DuplicateEnvironment { name: String },

    #[error("environment '{environment}': min_capacity ({min}) exceeds max_capacity ({max})")]
    InvalidCapacity {
        environment: String,
        min: u32,
        max: u32,
    },

    #[error("environment '{environment}': {field} must not be empty")]
    EmptyField {
        environment: String,
        field: &'static str,
    },

    #[error("environment '{environment}': {field} is not set by the environment, its profile or [defaults]")]
    MissingField {
        environment: String,
        field: &'static str,
    },

    #[error("environment '{environment}' extends unknown profile '{profile}'")]
    UnknownProfile {
        environment: String,
        profile: String,
    },

    #[error("unknown token {{{token}}} in: {input}")]
    UnknownToken { token: String, input: String },

    #[error("unclosed token in string: {input}")]
    UnclosedToken { input: String },

    #[error("failed to parse registry file {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read registry file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
