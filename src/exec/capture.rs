// src/exec/capture.rs

//! Concurrent draining of child output into a [`CaptureBuffer`].
//!
//! One drain unit (a Tokio task) per invocation reads stdout and stderr in
//! parallel with the process. The buffer is only appended to by that task;
//! readers either take a [`CaptureBuffer::snapshot`] while it still grows or
//! wait for [`DrainHandle::finish`] to get the final bytes.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{Error, ExtparseError, Result};
use crate::types::StderrMode;

const CHUNK_SIZE: usize = 8 * 1024;

/// Append-only byte buffer shared between the drain unit and its reader.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A panicking writer cannot leave a half-appended chunk behind, so
        // poisoned data is still valid.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn append(&self, chunk: &[u8]) {
        self.lock().extend_from_slice(chunk);
    }

    /// Copy of everything captured so far.
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.lock())
    }
}

/// Handle to a running drain unit.
#[derive(Debug)]
pub struct DrainHandle {
    buffer: CaptureBuffer,
    handle: JoinHandle<Result<u64>>,
}

impl DrainHandle {
    /// Bytes captured so far; may still be growing.
    pub fn snapshot(&self) -> Vec<u8> {
        self.buffer.snapshot()
    }

    /// Wait until both streams hit EOF and return the final buffer.
    pub async fn finish(self) -> Result<Vec<u8>> {
        let bytes = self.handle.await.map_err(Error::from)??;
        debug!(bytes, "drain complete");
        Ok(self.buffer.take())
    }
}

/// Start draining `stdout` (and `stderr`, per `mode`) on a new task.
pub fn spawn_drain(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    mode: StderrMode,
) -> DrainHandle {
    let buffer = CaptureBuffer::new();
    let sink = buffer.clone();

    let handle = tokio::spawn(async move {
        let sink = &sink;
        let out = async move {
            match stdout {
                Some(stdout) => pump(stdout, sink).await,
                None => Ok(0),
            }
        };
        let err = async move {
            match (stderr, mode) {
                (Some(stderr), StderrMode::Merge) => pump(stderr, sink).await,
                (Some(stderr), StderrMode::Ignore) => log_lines(stderr).await,
                (None, _) => Ok(0),
            }
        };

        let (out, err) = tokio::join!(out, err);
        let out = out.map_err(ExtparseError::Drain)?;
        let err = err.map_err(ExtparseError::Drain)?;

        Ok::<_, ExtparseError>(match mode {
            StderrMode::Merge => out + err,
            StderrMode::Ignore => out,
        })
    });

    DrainHandle { buffer, handle }
}

/// Copy `reader` into `buffer` chunk by chunk until EOF.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, buffer: &CaptureBuffer) -> std::io::Result<u64> {
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(total);
        }
        buffer.append(&chunk[..n]);
        total += n as u64;
    }
}

/// Consume `reader` so the child never blocks on it; log lines at debug.
async fn log_lines<R: AsyncRead + Unpin>(reader: R) -> std::io::Result<u64> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut total = 0u64;
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            return Ok(total);
        }
        total += n as u64;
        debug!("stderr: {}", String::from_utf8_lossy(&line).trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pump_copies_every_byte() {
        let buffer = CaptureBuffer::new();
        let data = vec![7u8; CHUNK_SIZE * 3 + 17];

        let n = pump(&data[..], &buffer).await.unwrap();

        assert_eq!(n as usize, data.len());
        assert_eq!(buffer.snapshot(), data);
    }

    #[tokio::test]
    async fn log_lines_counts_but_does_not_capture() {
        let n = log_lines(&b"warn: one\nwarn: two"[..]).await.unwrap();
        assert_eq!(n, 19);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn merge_mode_captures_stderr_too() {
        use crate::command::ResolvedCommand;
        use crate::exec::{launch, ExecutionContext};

        let cmd = ResolvedCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "printf out; printf err >&2".to_string()],
        };
        let mut process = launch(&cmd, false, &ExecutionContext::new()).unwrap();
        let drain = spawn_drain(
            process.stdout.take(),
            process.stderr.take(),
            StderrMode::Merge,
        );
        process.wait().await.unwrap();

        let mut captured = drain.finish().await.unwrap();
        captured.sort_unstable();
        let mut expected = b"outerr".to_vec();
        expected.sort_unstable();
        assert_eq!(captured, expected);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_output_does_not_deadlock() {
        use crate::command::ResolvedCommand;
        use crate::exec::{launch, ExecutionContext};

        // Far more than a pipe buffer; only completes if drained concurrently.
        let cmd = ResolvedCommand {
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "i=0; while [ $i -lt 20000 ]; do echo 0123456789abcdef; i=$((i+1)); done".to_string(),
            ],
        };
        let mut process = launch(&cmd, false, &ExecutionContext::new()).unwrap();
        let drain = spawn_drain(
            process.stdout.take(),
            process.stderr.take(),
            StderrMode::Ignore,
        );
        process.wait().await.unwrap();

        assert_eq!(drain.finish().await.unwrap().len(), 20000 * 17);
    }
}
