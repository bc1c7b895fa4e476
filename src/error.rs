//! Error types.
//!
//! Runtime code degrades gracefully instead of failing; the only fallible
//! surface is turning a configuration document into a [`crate::config::WeaponConfig`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read weapon config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse weapon config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("weapon config field `{field}` has invalid value {value}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
