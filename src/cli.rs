// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::CompletionPolicy;

/// Command-line arguments for `extparse`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "extparse",
    version,
    about = "Extract text and metadata from documents by running external tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Extparse.toml")]
    pub config: String,

    /// Parser to run. May be omitted when the config defines exactly one.
    #[arg(long, short, value_name = "NAME")]
    pub parser: Option<String>,

    /// Override the parser's completion policy (waiting, non-waiting).
    #[arg(long, value_name = "POLICY")]
    pub completion: Option<CompletionPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `EXTPARSE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate the config and print the parsers; run nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Only run the parser's availability check.
    #[arg(long)]
    pub check: bool,

    /// Print extracted metadata after the text.
    #[arg(long)]
    pub metadata: bool,

    /// Input document; `-` or omitted reads STDIN.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_invocation() {
        let args = CliArgs::try_parse_from([
            "extparse",
            "--config",
            "tools.toml",
            "-p",
            "ffprobe",
            "--completion",
            "non-waiting",
            "--metadata",
            "movie.mp4",
        ])
        .unwrap();

        assert_eq!(args.config, "tools.toml");
        assert_eq!(args.parser.as_deref(), Some("ffprobe"));
        assert_eq!(args.completion, Some(CompletionPolicy::NonWaiting));
        assert!(args.metadata);
        assert_eq!(args.input, Some(PathBuf::from("movie.mp4")));
    }

    #[test]
    fn defaults_to_stdin_and_default_config() {
        let args = CliArgs::try_parse_from(["extparse"]).unwrap();
        assert_eq!(args.config, "Extparse.toml");
        assert!(args.input.is_none());
        assert!(!args.dry_run && !args.check);
    }

    #[test]
    fn completion_accepts_aliases_and_rejects_unknown() {
        let args = CliArgs::try_parse_from(["extparse", "--completion", "no-wait"]).unwrap();
        assert_eq!(args.completion, Some(CompletionPolicy::NonWaiting));

        let args = CliArgs::try_parse_from(["extparse", "--completion", "Waiting"]).unwrap();
        assert_eq!(args.completion, Some(CompletionPolicy::Waiting));

        assert!(CliArgs::try_parse_from(["extparse", "--completion", "sometimes"]).is_err());
    }
}
