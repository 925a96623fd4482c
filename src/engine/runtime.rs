// src/engine/runtime.rs

use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::CommandTemplate;
use crate::errors::{Error, ExtparseError, Result};
use crate::exec::{
    launch, spawn_drain, spawn_stdin_feeder, AvailabilityCheck, DrainHandle, ExecutionContext,
    RunningProcess, TempArtifacts,
};
use crate::metadata::record::{MetadataSink, TextSink};
use crate::metadata::{extract_metadata, ExtractionPatterns, Metadata};
use crate::types::{CompletionPolicy, StderrMode};

use super::core::{CompletionMachine, Phase};
use super::ProcessOutcome;

/// Extracts text and metadata by running an external command-line tool.
///
/// The extractor itself is immutable configuration; every call to
/// [`ExternalExtractor::extract`] gets its own artifacts, child process and
/// drain unit, so one extractor can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct ExternalExtractor {
    name: String,
    template: CommandTemplate,
    patterns: ExtractionPatterns,
    policy: CompletionPolicy,
    stderr: StderrMode,
    timeout: Option<Duration>,
    defaults: ExecutionContext,
    check: Option<AvailabilityCheck>,
    mime_types: Vec<String>,
}

/// Result of one invocation.
#[derive(Debug)]
pub struct Extraction {
    /// Captured text. Final under the waiting policy, possibly partial under
    /// the non-waiting one. Invalid UTF-8 is replaced with U+FFFD.
    pub text: String,
    pub metadata: Metadata,
    pub completion: Completion,
    /// Phases the invocation went through, in order.
    pub phases: Vec<Phase>,
}

/// How the external process stood when control returned to the caller.
#[derive(Debug)]
pub enum Completion {
    /// Waiting policy: the process had exited and output was fully drained.
    Exited(ProcessOutcome),
    /// Non-waiting policy: the process may still be running.
    Detached(PendingCompletion),
}

impl Completion {
    /// The exit outcome if it was known at return time.
    pub fn outcome(&self) -> Option<ProcessOutcome> {
        match self {
            Completion::Exited(outcome) => Some(*outcome),
            Completion::Detached(_) => None,
        }
    }
}

/// Background completion of a non-waiting invocation.
///
/// The background task owns the child, the drain unit and the temporary
/// artifacts. It deletes the artifacts once the process has exited and its
/// output is drained, whether or not this handle is awaited.
#[derive(Debug)]
pub struct PendingCompletion {
    handle: JoinHandle<Result<FinishedProcess>>,
}

/// Final state of a detached invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedProcess {
    /// Everything the process wrote to the captured channel, decoded the
    /// same way as [`Extraction::text`].
    pub text: String,
    pub outcome: ProcessOutcome,
}

impl PendingCompletion {
    /// Wait for exit, full drain and artifact cleanup.
    pub async fn finish(self) -> Result<FinishedProcess> {
        self.handle.await.map_err(Error::from)?
    }
}

impl ExternalExtractor {
    pub fn new(template: CommandTemplate) -> Self {
        Self {
            name: template.program().to_string(),
            template,
            patterns: ExtractionPatterns::new(),
            policy: CompletionPolicy::default(),
            stderr: StderrMode::default(),
            timeout: None,
            defaults: ExecutionContext::default(),
            check: None,
            mime_types: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_patterns(mut self, patterns: ExtractionPatterns) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_policy(mut self, policy: CompletionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_stderr(mut self, mode: StderrMode) -> Self {
        self.stderr = mode;
        self
    }

    /// Deadline for the waiting policy. Ignored by the non-waiting policy.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_context(mut self, ctx: ExecutionContext) -> Self {
        self.defaults = ctx;
        self
    }

    pub fn with_check(mut self, check: Option<AvailabilityCheck>) -> Self {
        self.check = check;
        self
    }

    pub fn with_mime_types(mut self, mime_types: Vec<String>) -> Self {
        self.mime_types = mime_types;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &CommandTemplate {
        &self.template
    }

    pub fn patterns(&self) -> &ExtractionPatterns {
        &self.patterns
    }

    pub fn policy(&self) -> CompletionPolicy {
        self.policy
    }

    pub fn stderr_mode(&self) -> StderrMode {
        self.stderr
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn defaults(&self) -> &ExecutionContext {
        &self.defaults
    }

    pub fn check(&self) -> Option<&AvailabilityCheck> {
        self.check.as_ref()
    }

    pub fn mime_types(&self) -> &[String] {
        &self.mime_types
    }

    /// Run the configured availability probe; `true` if none is configured.
    pub async fn is_available(&self) -> bool {
        match &self.check {
            Some(check) => check.run().await,
            None => true,
        }
    }

    /// Run the tool over `input` and return text, metadata and completion.
    ///
    /// If the command contains `${INPUT}` the input is written to a
    /// temporary file first; otherwise it is piped to the child's stdin.
    /// Launch and drain failures are errors; a non-zero exit is not.
    pub async fn extract<R>(&self, mut input: R, ctx: &ExecutionContext) -> Result<Extraction>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let ctx = ctx.merged_over(&self.defaults);
        let temp_dir = ctx.temp_dir.as_deref();
        let mut machine = CompletionMachine::new(self.policy);

        let mut artifacts = TempArtifacts::new();
        if self.template.uses_input_file() {
            artifacts.create_input(&mut input, temp_dir).await?;
        }
        if self.template.uses_output_file() {
            artifacts.create_output(temp_dir)?;
        }

        let resolved = self
            .template
            .resolve(artifacts.input_path(), artifacts.output_path())?;

        info!(
            parser = %self.name,
            cmd = %resolved,
            policy = ?self.policy,
            "running external extractor"
        );

        let pipe_stdin = !self.template.uses_input_file();
        let mut process = launch(&resolved, pipe_stdin, &ctx)?;

        let feeder = process
            .stdin
            .take()
            .map(|stdin| spawn_stdin_feeder(stdin, input));
        machine.advance(Phase::StreamsBound)?;

        let drain = spawn_drain(process.stdout.take(), process.stderr.take(), self.stderr);
        machine.advance(Phase::Draining)?;

        let bound = Bound {
            process,
            drain,
            feeder,
            artifacts,
        };

        if machine.suspends_before_extraction() {
            self.complete_waiting(machine, bound).await
        } else {
            self.complete_detached(machine, bound).await
        }
    }

    /// [`ExternalExtractor::extract`], depositing into caller-owned sinks.
    pub async fn parse<R>(
        &self,
        input: R,
        text: &mut dyn TextSink,
        metadata: &mut dyn MetadataSink,
        ctx: &ExecutionContext,
    ) -> Result<Completion>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let extraction = self.extract(input, ctx).await?;
        text.set_text(extraction.text);
        extraction.metadata.merge_into(metadata);
        Ok(extraction.completion)
    }

    async fn complete_waiting(
        &self,
        mut machine: CompletionMachine,
        bound: Bound,
    ) -> Result<Extraction> {
        let Bound {
            mut process,
            drain,
            feeder,
            artifacts,
        } = bound;

        let (outcome, captured) = match self.timeout {
            Some(limit) => {
                let res = tokio::time::timeout(limit, run_to_completion(&mut process, drain)).await;
                match res {
                    Ok(res) => res?,
                    Err(_) => {
                        warn!(parser = %self.name, timeout = ?limit, "external process timed out; killing");
                        process.kill().await;
                        abort_feeder(feeder);
                        artifacts.cleanup();
                        return Err(ExtparseError::Timeout(limit));
                    }
                }
            }
            None => run_to_completion(&mut process, drain).await?,
        };
        machine.advance(Phase::ProcessExited)?;
        abort_feeder(feeder);

        let mut captured = captured;
        captured.extend(artifacts.read_output().await.map_err(ExtparseError::Drain)?);
        machine.advance(Phase::DrainComplete)?;

        let text = decode_text(captured, &self.name);
        let metadata = extract_metadata(&text, &self.patterns);
        machine.advance(Phase::Extracted)?;

        artifacts.cleanup();
        machine.advance(Phase::Returned)?;

        debug!(
            parser = %self.name,
            bytes = text.len(),
            fields = metadata.len(),
            "extraction complete"
        );

        Ok(Extraction {
            text,
            metadata,
            completion: Completion::Exited(outcome),
            phases: machine.into_trail(),
        })
    }

    async fn complete_detached(
        &self,
        mut machine: CompletionMachine,
        bound: Bound,
    ) -> Result<Extraction> {
        let mut captured = bound.drain.snapshot();
        captured.extend(
            bound
                .artifacts
                .read_output()
                .await
                .map_err(ExtparseError::Drain)?,
        );

        let text = decode_text(captured, &self.name);
        let metadata = extract_metadata(&text, &self.patterns);
        machine.advance(Phase::Extracted)?;

        let name = self.name.clone();
        let handle = tokio::spawn(async move {
            let Bound {
                mut process,
                drain,
                feeder,
                artifacts,
            } = bound;

            let (outcome, mut captured) = run_to_completion(&mut process, drain).await?;
            abort_feeder(feeder);
            captured.extend(artifacts.read_output().await.map_err(ExtparseError::Drain)?);
            artifacts.cleanup();

            debug!(parser = %name, bytes = captured.len(), "detached extraction finished");
            Ok::<_, ExtparseError>(FinishedProcess {
                text: decode_text(captured, &name),
                outcome,
            })
        });
        machine.advance(Phase::Returned)?;

        debug!(
            parser = %self.name,
            bytes = text.len(),
            fields = metadata.len(),
            "returning before external process exit"
        );

        Ok(Extraction {
            text,
            metadata,
            completion: Completion::Detached(PendingCompletion { handle }),
            phases: machine.into_trail(),
        })
    }
}

/// Handles owned by an invocation once its streams are bound.
struct Bound {
    process: RunningProcess,
    drain: DrainHandle,
    feeder: Option<JoinHandle<()>>,
    artifacts: TempArtifacts,
}

/// Decode captured bytes, replacing invalid UTF-8 sequences.
fn decode_text(captured: Vec<u8>, parser: &str) -> String {
    match String::from_utf8(captured) {
        Ok(text) => text,
        Err(e) => {
            debug!(
                parser,
                valid_up_to = e.utf8_error().valid_up_to(),
                "captured output is not valid UTF-8; replacing invalid sequences"
            );
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    }
}

/// Suspend on child exit, then on drain completion.
async fn run_to_completion(
    process: &mut RunningProcess,
    drain: DrainHandle,
) -> Result<(ProcessOutcome, Vec<u8>)> {
    let outcome = process.wait().await?;
    let captured = drain.finish().await?;
    Ok((outcome, captured))
}

fn abort_feeder(feeder: Option<JoinHandle<()>>) {
    if let Some(feeder) = feeder {
        feeder.abort();
    }
}
