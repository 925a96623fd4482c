// src/exec/check.rs

//! Probe whether an external tool is installed and usable.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

/// Exit code shells use for "command not found".
pub const DEFAULT_ERROR_CODES: &[i32] = &[127];

/// A probe command plus the exit codes that mean "not available".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityCheck {
    pub command: Vec<String>,
    pub error_codes: Vec<i32>,
}

impl AvailabilityCheck {
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            error_codes: DEFAULT_ERROR_CODES.to_vec(),
        }
    }

    pub fn with_error_codes(mut self, codes: impl Into<Vec<i32>>) -> Self {
        self.error_codes = codes.into();
        self
    }

    pub async fn run(&self) -> bool {
        check_available(&self.command, &self.error_codes).await
    }
}

/// Run `command` with every stream discarded.
///
/// Returns `false` if it cannot be launched, is killed by a signal, or exits
/// with one of `error_codes`.
pub async fn check_available(command: &[String], error_codes: &[i32]) -> bool {
    let Some((program, args)) = command.split_first() else {
        debug!("empty availability check command");
        return false;
    };

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await;

    match status {
        Ok(status) => match status.code() {
            Some(code) if error_codes.contains(&code) => {
                debug!(program = %program, exit_code = code, "availability check reported an error code");
                false
            }
            Some(_) => true,
            None => {
                debug!(program = %program, "availability check terminated by signal");
                false
            }
        },
        Err(e) => {
            debug!(program = %program, error = %e, "availability check could not launch");
            false
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn installed_tool_is_available() {
        assert!(AvailabilityCheck::new(["true"]).run().await);
    }

    #[tokio::test]
    async fn missing_tool_is_unavailable() {
        assert!(!AvailabilityCheck::new(["/no/such/extparse-tool"]).run().await);
        assert!(!check_available(&[], &[]).await);
    }

    #[tokio::test]
    async fn listed_exit_code_marks_tool_unavailable() {
        let check = AvailabilityCheck::new(["sh", "-c", "exit 2"]);
        assert!(check.run().await, "2 is not in the default error codes");
        assert!(!check.with_error_codes(vec![1, 2]).run().await);
    }
}
