// src/command/template.rs

use std::fmt;
use std::path::Path;

use crate::errors::{ExtparseError, Result};

/// Replaced by the path of the temporary file holding the caller's input.
pub const INPUT_TOKEN: &str = "${INPUT}";

/// Replaced by the path of the temporary file the tool writes its output to.
pub const OUTPUT_TOKEN: &str = "${OUTPUT}";

/// Ordered argument vector with optional placeholder tokens.
///
/// The first token is the program; the rest are its arguments. Placeholders
/// must be whole tokens: `--in=${INPUT}` is passed through literally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

/// A command with every placeholder substituted, ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    /// Build a template; fails if the vector is empty or the program is blank.
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        match tokens.first() {
            None => Err(ExtparseError::ConfigError(
                "command must contain at least the program name".to_string(),
            )),
            Some(program) if program.trim().is_empty() => Err(ExtparseError::ConfigError(
                "command program name must not be blank".to_string(),
            )),
            Some(_) => Ok(Self { tokens }),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// True if the input is delivered through a temporary file.
    ///
    /// When false the input is piped into the child's standard input.
    pub fn uses_input_file(&self) -> bool {
        self.tokens.iter().any(|t| t == INPUT_TOKEN)
    }

    /// True if the tool writes its primary output to a temporary file.
    pub fn uses_output_file(&self) -> bool {
        self.tokens.iter().any(|t| t == OUTPUT_TOKEN)
    }

    /// Substitute every placeholder occurrence with the supplied paths.
    ///
    /// Fails with a configuration error if a placeholder is present but the
    /// matching path is `None`. Extra paths are ignored.
    pub fn resolve(&self, input: Option<&Path>, output: Option<&Path>) -> Result<ResolvedCommand> {
        let mut resolved = Vec::with_capacity(self.tokens.len());

        for token in &self.tokens {
            let value = match token.as_str() {
                INPUT_TOKEN => path_for(INPUT_TOKEN, input)?,
                OUTPUT_TOKEN => path_for(OUTPUT_TOKEN, output)?,
                _ => token.clone(),
            };
            resolved.push(value);
        }

        let mut iter = resolved.into_iter();
        // `new` guarantees at least one token.
        let program = iter.next().unwrap_or_default();
        Ok(ResolvedCommand {
            program,
            args: iter.collect(),
        })
    }
}

fn path_for(token: &str, path: Option<&Path>) -> Result<String> {
    path.map(|p| p.to_string_lossy().into_owned()).ok_or_else(|| {
        ExtparseError::ConfigError(format!(
            "command references {token} but no path was supplied for it"
        ))
    })
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
