//! Configuration loading from disk and the environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `upstream.base_url`.
pub const ENV_UPSTREAM: &str = "API_RELAY_UPSTREAM";
/// Overrides `listener.bind_address`.
pub const ENV_BIND: &str = "API_RELAY_BIND";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

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

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides using the given lookup.
///
/// Empty values are ignored.
pub fn apply_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(upstream) = lookup(ENV_UPSTREAM).filter(|v| !v.is_empty()) {
        tracing::debug!(upstream = %upstream, "Upstream overridden from environment");
        config.upstream.base_url = upstream;
    }
    if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
        tracing::debug!(bind = %bind, "Bind address overridden from environment");
        config.listener.bind_address = bind;
    }
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut RelayConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}
