// src/exec/mod.rs

//! Process execution layer.
//!
//! Everything here is scoped to a single invocation: the artifacts, the
//! child process and the drain unit are owned handles that are released on
//! every exit path.
//!
//! - [`artifacts`] creates and deletes the temporary input/output files.
//! - [`runner`] launches the child with `tokio::process::Command` and feeds
//!   its standard input when the input is piped.
//! - [`capture`] drains stdout (and stderr) concurrently into a
//!   [`CaptureBuffer`].
//! - [`check`] probes whether an external tool is installed.
//! - [`context`] carries per-call working directory / environment overrides.

pub mod artifacts;
pub mod capture;
pub mod check;
pub mod context;
pub mod runner;

pub use artifacts::TempArtifacts;
pub use capture::{spawn_drain, CaptureBuffer, DrainHandle};
pub use check::{check_available, AvailabilityCheck};
pub use context::ExecutionContext;
pub use runner::{launch, spawn_stdin_feeder, RunningProcess};
