// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** compile patterns
/// or check commands. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it and build extractors.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}
