// src/errors.rs

//! Crate-wide error type and result alias.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtparseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid extraction pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to drain process output: {0}")]
    Drain(#[source] std::io::Error),

    #[error("External process did not finish within {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ExtparseError>;
