// src/config/mod.rs

//! Configuration loading and validation for extparse.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it and build ready-to-run extractors (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    CheckConfig, ConfigFile, DefaultSection, ParserConfig, PatternConfig, RawConfigFile,
};
