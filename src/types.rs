use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// When an invocation is considered finished relative to process exit and
/// output draining.
///
/// - `Waiting`: block until the child has exited and every byte it wrote
///   has been drained, then extract (default).
/// - `NonWaiting`: return as soon as streams are bound and draining has
///   begun. Text and metadata reflect whatever was captured at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionPolicy {
    Waiting,
    NonWaiting,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        CompletionPolicy::Waiting
    }
}

impl CompletionPolicy {
    /// Whether the calling flow suspends on child exit and drain completion.
    pub fn waits_for_exit(self) -> bool {
        matches!(self, CompletionPolicy::Waiting)
    }
}

impl FromStr for CompletionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" | "wait" => Ok(CompletionPolicy::Waiting),
            "non-waiting" | "nonwaiting" | "no-wait" => Ok(CompletionPolicy::NonWaiting),
            other => Err(format!(
                "invalid completion policy: {other} (expected \"waiting\" or \"non-waiting\")"
            )),
        }
    }
}

/// What happens to the child's standard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrMode {
    /// Drain and log at debug level; not part of the captured text.
    Ignore,
    /// Append to the captured output buffer as it arrives.
    Merge,
}

impl Default for StderrMode {
    fn default() -> Self {
        StderrMode::Ignore
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {} x {}s", value, factor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration(" 2m "), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5d").is_err());
    }

    #[test]
    fn rejects_durations_that_overflow() {
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("99999999999999999h").is_err());
        assert_eq!(
            parse_duration("307445734561825860m"),
            Ok(Duration::from_secs(307445734561825860 * 60))
        );
    }

    #[test]
    fn completion_policy_from_str() {
        assert_eq!("waiting".parse(), Ok(CompletionPolicy::Waiting));
        assert_eq!("Non-Waiting".parse(), Ok(CompletionPolicy::NonWaiting));
        assert!("sometimes".parse::<CompletionPolicy>().is_err());
        assert!(CompletionPolicy::Waiting.waits_for_exit());
        assert!(!CompletionPolicy::NonWaiting.waits_for_exit());
    }
}
