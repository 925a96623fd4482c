// src/engine/mod.rs

//! Invocation engine for external extractors.
//!
//! The completion state machine lives in [`core`]: it is synchronous and
//! knows nothing about processes, so both completion policies share one set
//! of transitions. The async shell that launches the tool, binds streams,
//! suspends where the policy says and runs extraction is [`runtime`].

use std::process::ExitStatus;

/// Exit outcome of the external process.
///
/// A non-zero exit is not an error: output and metadata are still returned
/// and the caller decides what to do with a `Failed` outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Success,
    /// Exit code, or -1 when the process was terminated by a signal.
    Failed(i32),
}

impl ProcessOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, ProcessOutcome::Success)
    }
}

impl From<ExitStatus> for ProcessOutcome {
    fn from(status: ExitStatus) -> Self {
        if status.success() {
            ProcessOutcome::Success
        } else {
            ProcessOutcome::Failed(status.code().unwrap_or(-1))
        }
    }
}

pub mod core;
pub mod runtime;

pub use core::{CompletionMachine, Phase};
pub use runtime::{Completion, Extraction, ExternalExtractor, FinishedProcess, PendingCompletion};
pub use crate::types::CompletionPolicy;
