//! Environment variable helpers shared by every configuration builder.

use std::env;
use std::time::Duration;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("No model credentials configured: set TGI_URL or OPENAI_API_KEY")]
    MissingCredentials,
}

/// Upper bound accepted for any configured timeout.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Read a non-empty string variable.
pub fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub fn get_env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match get_env_string(key) {
        Some(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        None => Ok(None),
    }
}

pub fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    match get_env_string(key) {
        Some(val) => val
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid unsigned integer '{val}': {e}"),
            }),
        None => Ok(None),
    }
}

pub fn get_env_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    match get_env_string(key) {
        Some(val) => val
            .trim()
            .parse::<u16>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid port number '{val}': {e}"),
            }),
        None => Ok(None),
    }
}

/// Read a timeout expressed in whole seconds.
pub fn get_env_secs(key: &str) -> Result<Option<Duration>, ConfigError> {
    Ok(get_env_u64(key)?.map(Duration::from_secs))
}

/// Check that a timeout is non-zero and no longer than [`MAX_TIMEOUT_SECS`].
pub fn validate_timeout(name: &str, timeout: Duration) -> Result<(), ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be greater than 0"
        )));
    }
    if timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be <= {MAX_TIMEOUT_SECS} seconds"
        )));
    }
    Ok(())
}
