// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod metadata;
pub mod types;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{Completion, Extraction};
use crate::exec::ExecutionContext;

pub use crate::command::{CommandTemplate, INPUT_TOKEN, OUTPUT_TOKEN};
pub use crate::engine::{ExternalExtractor, ProcessOutcome};
pub use crate::metadata::{ExtractionPatterns, Metadata};
pub use crate::types::{CompletionPolicy, StderrMode};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, selects a parser and either prints the config
/// (`--dry-run`), runs the availability probe (`--check`), or extracts from
/// the input and prints the result. Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config from {:?}", args.config))?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(0);
    }

    let mut extractor = cfg.select(args.parser.as_deref())?.clone();
    if let Some(policy) = args.completion {
        extractor = extractor.with_policy(policy);
    }

    if args.check {
        let available = extractor.is_available().await;
        println!(
            "{}: {}",
            extractor.name(),
            if available { "available" } else { "unavailable" }
        );
        return Ok(if available { 0 } else { 2 });
    }

    let input = open_input(args.input.as_deref()).await?;
    let extraction = extractor
        .extract(input, &ExecutionContext::default())
        .await
        .with_context(|| format!("running parser '{}'", extractor.name()))?;

    print_extraction(&extraction, args.metadata)?;

    let outcome = match extraction.completion {
        Completion::Exited(outcome) => outcome,
        Completion::Detached(pending) => {
            info!("returned before the external process exited; waiting for cleanup");
            pending.finish().await?.outcome
        }
    };

    if let ProcessOutcome::Failed(code) = outcome {
        warn!(parser = %extractor.name(), exit_code = code, "external tool reported failure");
    }
    Ok(0)
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(p) if p != Path::new("-") => {
            let file = tokio::fs::File::open(p)
                .await
                .with_context(|| format!("opening input {:?}", p))?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(tokio::io::stdin())),
    }
}

fn print_extraction(extraction: &Extraction, with_metadata: bool) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(extraction.text.as_bytes())?;

    if with_metadata && !extraction.metadata.is_empty() {
        if !extraction.text.is_empty() && !extraction.text.ends_with('\n') {
            writeln!(out)?;
        }
        writeln!(out, "---")?;
        write!(out, "{}", extraction.metadata)?;
    }
    out.flush()?;
    Ok(())
}

/// Simple dry-run output: print parsers, commands and patterns.
fn print_dry_run(cfg: &ConfigFile) {
    println!("extparse dry-run");
    println!("  default.completion = {:?}", cfg.default.completion);
    println!("  default.stderr = {:?}", cfg.default.stderr);
    println!();

    println!("parsers ({}):", cfg.parser.len());
    for name in cfg.parser_names() {
        let Ok(extractor) = cfg.extractor(name) else {
            continue;
        };
        println!("  - {name}");
        println!("      command: {}", extractor.template());
        println!("      completion: {:?}", extractor.policy());
        println!("      stderr: {:?}", extractor.stderr_mode());
        if !extractor.mime_types().is_empty() {
            println!("      mime_types: {:?}", extractor.mime_types());
        }
        if let Some(timeout) = extractor.timeout() {
            println!("      timeout: {timeout:?}");
        }
        if let Some(check) = extractor.check() {
            println!("      check: {:?}", check.command);
        }
        for (regex, field) in extractor.patterns().iter() {
            println!("      metadata: {field} <- {}", regex.as_str());
        }
    }

    debug!("dry-run complete (no execution)");
}
