// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::engine::ExternalExtractor;
use crate::errors::{ExtparseError, Result};
use crate::types::{CompletionPolicy, StderrMode};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [default]
/// completion = "waiting"
/// stderr = "ignore"
///
/// [parser.ffmpeg]
/// command = ["ffmpeg", "-i", "${INPUT}"]
/// stderr = "merge"
///
/// [[parser.ffmpeg.metadata]]
/// pattern = 'Duration: (\d+:\d+:\d+\.?\d?\d?), '
/// field = "duration"
/// ```
///
/// This is the raw deserialised form; convert it with
/// `ConfigFile::try_from` to get validated, compiled extractors.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Defaults from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All parsers from `[parser.<name>]`.
    #[serde(default)]
    pub parser: BTreeMap<String, ParserConfig>,
}

/// `[default]` section, applied to parsers that do not override a value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultSection {
    #[serde(default)]
    pub completion: CompletionPolicy,

    #[serde(default)]
    pub stderr: StderrMode,

    /// Duration string (e.g. `"30s"`) bounding the waiting policy.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Directory for temporary artifacts; the system temp dir if unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// `[parser.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParserConfig {
    /// Program followed by its arguments; may contain `${INPUT}` and
    /// `${OUTPUT}` tokens.
    pub command: Vec<String>,

    /// Media types this tool handles. Informational only.
    #[serde(default)]
    pub mime_types: Vec<String>,

    #[serde(default)]
    pub completion: Option<CompletionPolicy>,

    #[serde(default)]
    pub stderr: Option<StderrMode>,

    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub check: Option<CheckConfig>,

    /// `[[parser.<name>.metadata]]` entries, applied in file order.
    #[serde(default)]
    pub metadata: Vec<PatternConfig>,
}

/// `[parser.<name>.check]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    pub command: Vec<String>,

    #[serde(default = "default_error_codes")]
    pub error_codes: Vec<i32>,
}

fn default_error_codes() -> Vec<i32> {
    crate::exec::check::DEFAULT_ERROR_CODES.to_vec()
}

/// One `[[parser.<name>.metadata]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub pattern: String,
    pub field: String,
}

/// Validated configuration.
///
/// Every parser has already been turned into an [`ExternalExtractor`], so
/// malformed patterns or durations never survive past loading.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub default: DefaultSection,
    pub parser: BTreeMap<String, ParserConfig>,
    extractors: BTreeMap<String, ExternalExtractor>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        default: DefaultSection,
        parser: BTreeMap<String, ParserConfig>,
        extractors: BTreeMap<String, ExternalExtractor>,
    ) -> Self {
        Self {
            default,
            parser,
            extractors,
        }
    }

    pub fn parser_names(&self) -> impl Iterator<Item = &str> {
        self.extractors.keys().map(String::as_str)
    }

    /// Look up an extractor by parser name.
    pub fn extractor(&self, name: &str) -> Result<&ExternalExtractor> {
        self.extractors
            .get(name)
            .ok_or_else(|| ExtparseError::ConfigError(format!("unknown parser '{name}'")))
    }

    /// Resolve an optional `--parser` selection: an explicit name, or the
    /// only parser when exactly one is configured.
    pub fn select(&self, name: Option<&str>) -> Result<&ExternalExtractor> {
        match name {
            Some(name) => self.extractor(name),
            None => {
                let mut iter = self.extractors.values();
                match (iter.next(), iter.next()) {
                    (Some(only), None) => Ok(only),
                    _ => Err(ExtparseError::ConfigError(format!(
                        "config defines {} parsers; choose one with --parser",
                        self.extractors.len()
                    ))),
                }
            }
        }
    }
}
