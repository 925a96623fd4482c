// src/engine/core.rs

//! Pure completion state machine.
//!
//! ```text
//! STARTED → STREAMS_BOUND → DRAINING → PROCESS_EXITED → DRAIN_COMPLETE → EXTRACTED → RETURNED
//!                                    └──────────── non-waiting ────────────┘
//! ```
//!
//! The waiting policy walks every phase. The non-waiting policy skips
//! `ProcessExited` and `DrainComplete`: extraction runs on whatever has been
//! captured when `Draining` is reached, which is the documented race of that
//! policy. No Tokio types or IO live here.

use std::fmt;

use anyhow::anyhow;

use crate::errors::Result;
use crate::types::CompletionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Started,
    StreamsBound,
    Draining,
    ProcessExited,
    DrainComplete,
    Extracted,
    Returned,
}

const WAITING_PATH: &[Phase] = &[
    Phase::Started,
    Phase::StreamsBound,
    Phase::Draining,
    Phase::ProcessExited,
    Phase::DrainComplete,
    Phase::Extracted,
    Phase::Returned,
];

const NON_WAITING_PATH: &[Phase] = &[
    Phase::Started,
    Phase::StreamsBound,
    Phase::Draining,
    Phase::Extracted,
    Phase::Returned,
];

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Started => "STARTED",
            Phase::StreamsBound => "STREAMS_BOUND",
            Phase::Draining => "DRAINING",
            Phase::ProcessExited => "PROCESS_EXITED",
            Phase::DrainComplete => "DRAIN_COMPLETE",
            Phase::Extracted => "EXTRACTED",
            Phase::Returned => "RETURNED",
        };
        f.write_str(name)
    }
}

/// Tracks one invocation's progress through the phases of its policy.
#[derive(Debug, Clone)]
pub struct CompletionMachine {
    policy: CompletionPolicy,
    trail: Vec<Phase>,
}

impl CompletionMachine {
    pub fn new(policy: CompletionPolicy) -> Self {
        Self {
            policy,
            trail: vec![Phase::Started],
        }
    }

    /// Every phase an invocation under `policy` passes through, in order.
    pub fn path(policy: CompletionPolicy) -> &'static [Phase] {
        match policy {
            CompletionPolicy::Waiting => WAITING_PATH,
            CompletionPolicy::NonWaiting => NON_WAITING_PATH,
        }
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn current(&self) -> Phase {
        // The trail always starts with `Started`.
        self.trail.last().copied().unwrap_or(Phase::Started)
    }

    /// The phase that must come next, or `None` once returned.
    pub fn expected_next(&self) -> Option<Phase> {
        let path = Self::path(self.policy);
        path.get(self.trail.len()).copied()
    }

    /// Whether the caller must suspend on child exit and drain completion
    /// before extracting.
    pub fn suspends_before_extraction(&self) -> bool {
        self.policy.waits_for_exit()
    }

    /// Move to `next`. Skipping or repeating a phase is a bug in the caller.
    pub fn advance(&mut self, next: Phase) -> Result<()> {
        match self.expected_next() {
            Some(expected) if expected == next => {
                tracing::debug!(
                    policy = ?self.policy,
                    from = %self.current(),
                    to = %next,
                    "completion phase transition"
                );
                self.trail.push(next);
                Ok(())
            }
            expected => Err(anyhow!(
                "invalid completion transition {} -> {} under {:?} (expected {:?})",
                self.current(),
                next,
                self.policy,
                expected
            )
            .into()),
        }
    }

    pub fn is_returned(&self) -> bool {
        self.current() == Phase::Returned
    }

    pub fn trail(&self) -> &[Phase] {
        &self.trail
    }

    pub fn into_trail(self) -> Vec<Phase> {
        self.trail
    }
}
