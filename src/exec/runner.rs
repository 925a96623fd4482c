// src/exec/runner.rs

//! Child process launch and lifecycle.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::ResolvedCommand;
use crate::engine::ProcessOutcome;
use crate::errors::{ExtparseError, Result};
use crate::exec::context::ExecutionContext;

/// A launched child with its streams detached for independent handling.
///
/// `kill_on_drop` is set: dropping the handle before the child exits kills
/// it, so a failed invocation never leaks a process.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    pub stdin: Option<ChildStdin>,
    pub stdout: Option<ChildStdout>,
    pub stderr: Option<ChildStderr>,
}

/// Start `command`.
///
/// `pipe_stdin` selects between a piped standard input (input delivered via
/// [`spawn_stdin_feeder`]) and a null one (input delivered as a file).
/// Stdout and stderr are always piped.
pub fn launch(
    command: &ResolvedCommand,
    pipe_stdin: bool,
    ctx: &ExecutionContext,
) -> Result<RunningProcess> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .envs(&ctx.env)
        .stdin(if pipe_stdin { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &ctx.working_dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| ExtparseError::Launch {
        program: command.program.clone(),
        source,
    })?;

    info!(
        cmd = %command,
        pid = ?child.id(),
        pipe_stdin,
        "external process started"
    );

    Ok(RunningProcess {
        stdin: child.stdin.take(),
        stdout: child.stdout.take(),
        stderr: child.stderr.take(),
        child,
    })
}

impl RunningProcess {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Block until the child exits.
    ///
    /// Standard input is closed first so a tool waiting on EOF can finish.
    pub async fn wait(&mut self) -> Result<ProcessOutcome> {
        drop(self.stdin.take());
        let status = self.child.wait().await?;
        let outcome = ProcessOutcome::from(status);

        match outcome {
            ProcessOutcome::Success => info!(pid = ?self.id(), "external process exited"),
            ProcessOutcome::Failed(code) => {
                warn!(exit_code = code, "external process exited with non-zero status")
            }
        }
        Ok(outcome)
    }

    /// Kill the child and reap it.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!(error = %e, "failed to kill external process");
        }
    }
}

/// Copy `input` into the child's standard input on its own task.
///
/// Writing runs concurrently with draining so neither side blocks on a full
/// pipe. A child that exits without reading everything closes the pipe; that
/// is logged, not treated as an error.
pub fn spawn_stdin_feeder<R>(mut stdin: ChildStdin, mut input: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        match tokio::io::copy(&mut input, &mut stdin).await {
            Ok(bytes) => debug!(bytes, "finished writing input to stdin"),
            Err(e) => debug!(error = %e, "stdin closed before all input was written"),
        }
        if let Err(e) = stdin.shutdown().await {
            debug!(error = %e, "closing stdin");
        }
    })
}
