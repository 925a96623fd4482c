// src/exec/artifacts.rs

//! Temporary input/output files for one invocation.
//!
//! Both artifacts are `tempfile::TempPath`s: uniquely named and exclusively
//! owned. [`TempArtifacts::cleanup`] deletes them eagerly; dropping the
//! value does the same on every other exit path. A tool may replace an
//! owned path with a directory, which is removed recursively.

use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile, TempPath};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use crate::errors::Result;

const INPUT_PREFIX: &str = "extparse-in-";
const OUTPUT_PREFIX: &str = "extparse-out-";

#[derive(Debug, Default)]
pub struct TempArtifacts {
    input: Option<TempPath>,
    output: Option<TempPath>,
}

impl TempArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the whole of `input` into a fresh temporary file.
    pub async fn create_input<R>(&mut self, input: &mut R, temp_dir: Option<&Path>) -> Result<()>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let (file, path) = named_tempfile(INPUT_PREFIX, temp_dir)?.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        // On failure `path` is dropped here and the file removed.
        let written = tokio::io::copy(input, &mut file).await?;
        file.flush().await?;
        drop(file);

        debug!(path = ?path, bytes = written, "created temporary input artifact");
        self.input = Some(path);
        Ok(())
    }

    /// Create an empty temporary file for the tool to write into.
    pub fn create_output(&mut self, temp_dir: Option<&Path>) -> Result<()> {
        let path = named_tempfile(OUTPUT_PREFIX, temp_dir)?.into_temp_path();
        debug!(path = ?path, "created temporary output artifact");
        self.output = Some(path);
        Ok(())
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Paths currently owned, for diagnostics and tests.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.input_path()
            .into_iter()
            .chain(self.output_path())
            .map(Path::to_path_buf)
            .collect()
    }

    /// Read whatever the tool has written to the output artifact so far.
    pub async fn read_output(&self) -> std::io::Result<Vec<u8>> {
        match self.output_path() {
            Some(path) => tokio::fs::read(path).await,
            None => Ok(Vec::new()),
        }
    }

    /// Delete both artifacts now.
    pub fn cleanup(mut self) {
        self.remove_owned();
    }

    fn remove_owned(&mut self) {
        for path in [self.input.take(), self.output.take()].into_iter().flatten() {
            let removed = path.to_path_buf();
            match remove_artifact(path) {
                Ok(()) => debug!(path = ?removed, "removed temporary artifact"),
                Err(e) => warn!(path = ?removed, error = %e, "failed to remove temporary artifact"),
            }
        }
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        self.remove_owned();
    }
}

fn remove_artifact(path: TempPath) -> std::io::Result<()> {
    let is_dir = std::fs::symlink_metadata(&path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        return path.close();
    }
    let owned = path.to_path_buf();
    // `close` would fail with the path now a directory; forget it and
    // remove the tree ourselves.
    let _ = path.keep();
    std::fs::remove_dir_all(owned)
}

fn named_tempfile(prefix: &str, temp_dir: Option<&Path>) -> std::io::Result<NamedTempFile> {
    let mut builder = Builder::new();
    builder.prefix(prefix);
    match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
}
