// src/config/validate.rs

use std::collections::BTreeMap;
use std::time::Duration;

use crate::command::CommandTemplate;
use crate::config::model::{ConfigFile, DefaultSection, ParserConfig, RawConfigFile};
use crate::engine::ExternalExtractor;
use crate::errors::{ExtparseError, Result};
use crate::exec::{AvailabilityCheck, ExecutionContext};
use crate::metadata::ExtractionPatterns;
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::ExtparseError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_parsers(&raw)?;
        let default_timeout = parse_timeout("[default].timeout", raw.default.timeout.as_deref())?;

        let mut extractors = BTreeMap::new();
        for (name, parser) in raw.parser.iter() {
            let extractor = build_extractor(name, parser, &raw.default, default_timeout)?;
            extractors.insert(name.clone(), extractor);
        }

        Ok(ConfigFile::new_unchecked(raw.default, raw.parser, extractors))
    }
}

fn ensure_has_parsers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.parser.is_empty() {
        return Err(ExtparseError::ConfigError(
            "config must contain at least one [parser.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn build_extractor(
    name: &str,
    parser: &ParserConfig,
    defaults: &DefaultSection,
    default_timeout: Option<Duration>,
) -> Result<ExternalExtractor> {
    let template = CommandTemplate::new(parser.command.iter().cloned()).map_err(|e| {
        ExtparseError::ConfigError(format!("parser '{name}': invalid `command`: {e}"))
    })?;

    let mut patterns = ExtractionPatterns::new();
    for entry in &parser.metadata {
        if entry.field.trim().is_empty() {
            return Err(ExtparseError::ConfigError(format!(
                "parser '{name}': metadata pattern '{}' has an empty `field`",
                entry.pattern
            )));
        }
        patterns.add(&entry.pattern, entry.field.clone())?;
    }

    let timeout = match parser.timeout.as_deref() {
        Some(s) => parse_timeout(&format!("[parser.{name}].timeout"), Some(s))?,
        None => default_timeout,
    };

    let check = match &parser.check {
        Some(check) if check.command.is_empty() => {
            return Err(ExtparseError::ConfigError(format!(
                "parser '{name}': `check.command` must not be empty"
            )));
        }
        Some(check) => Some(
            AvailabilityCheck::new(check.command.iter().cloned())
                .with_error_codes(check.error_codes.clone()),
        ),
        None => None,
    };

    let ctx = ExecutionContext {
        working_dir: parser.working_dir.clone(),
        env: parser.env.clone(),
        temp_dir: defaults.temp_dir.clone(),
    };

    Ok(ExternalExtractor::new(template)
        .with_name(name)
        .with_patterns(patterns)
        .with_policy(parser.completion.unwrap_or(defaults.completion))
        .with_stderr(parser.stderr.unwrap_or(defaults.stderr))
        .with_timeout(timeout)
        .with_context(ctx)
        .with_check(check)
        .with_mime_types(parser.mime_types.clone()))
}

fn parse_timeout(key: &str, value: Option<&str>) -> Result<Option<Duration>> {
    value
        .map(|s| {
            parse_duration(s)
                .map_err(|e| ExtparseError::ConfigError(format!("invalid {key} '{s}': {e}")))
        })
        .transpose()
}
