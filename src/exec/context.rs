// src/exec/context.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

/// Per-invocation overrides supplied by the caller.
///
/// None of these are required; unset values fall back to the extractor's
/// configured defaults, then to the current process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Working directory for the child process.
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables for the child process.
    pub env: BTreeMap<String, String>,
    /// Directory in which temporary artifacts are created.
    pub temp_dir: Option<PathBuf>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Layer `self` over `base`: set fields win, env maps are merged with
    /// `self` taking precedence on conflicts.
    pub fn merged_over(&self, base: &ExecutionContext) -> ExecutionContext {
        let mut env = base.env.clone();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        ExecutionContext {
            working_dir: self.working_dir.clone().or_else(|| base.working_dir.clone()),
            env,
            temp_dir: self.temp_dir.clone().or_else(|| base.temp_dir.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_values_override_configured_defaults() {
        let base = ExecutionContext::new()
            .with_working_dir("/srv")
            .with_env("LANG", "C")
            .with_env("MODE", "base")
            .with_temp_dir("/var/tmp");
        let call = ExecutionContext::new().with_env("MODE", "call");

        let merged = call.merged_over(&base);

        assert_eq!(merged.working_dir, Some(PathBuf::from("/srv")));
        assert_eq!(merged.temp_dir, Some(PathBuf::from("/var/tmp")));
        assert_eq!(merged.env.get("LANG").map(String::as_str), Some("C"));
        assert_eq!(merged.env.get("MODE").map(String::as_str), Some("call"));
    }
}
