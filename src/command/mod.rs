// src/command/mod.rs

//! External command description.
//!
//! A command is an explicit argument vector, never a shell string. Two
//! reserved tokens, [`INPUT_TOKEN`] and [`OUTPUT_TOKEN`], mark where the
//! per-invocation temporary file paths are substituted.

pub mod template;

pub use template::{CommandTemplate, ResolvedCommand, INPUT_TOKEN, OUTPUT_TOKEN};
