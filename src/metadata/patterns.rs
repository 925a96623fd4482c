// src/metadata/patterns.rs

use regex::Regex;

use crate::errors::{ExtparseError, Result};

/// Mapping from compiled regular expression to metadata field name.
///
/// Entries keep insertion order. Several patterns may feed the same field.
/// Malformed expressions are rejected here, never during extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPatterns {
    entries: Vec<(Regex, String)>,
}

impl ExtractionPatterns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and map it to `field`.
    pub fn add(&mut self, pattern: &str, field: impl Into<String>) -> Result<()> {
        let regex = Regex::new(pattern).map_err(|source| ExtparseError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.entries.push((regex, field.into()));
        Ok(())
    }

    /// Builder-style variant of [`ExtractionPatterns::add`].
    pub fn with(mut self, pattern: &str, field: impl Into<String>) -> Result<Self> {
        self.add(pattern, field)?;
        Ok(self)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Regex, &str)> {
        self.entries.iter().map(|(re, field)| (re, field.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> TryFrom<&'a [(&'a str, &'a str)]> for ExtractionPatterns {
    type Error = ExtparseError;

    fn try_from(pairs: &'a [(&'a str, &'a str)]) -> std::result::Result<Self, Self::Error> {
        let mut table = Self::new();
        for (pattern, field) in pairs {
            table.add(pattern, *field)?;
        }
        Ok(table)
    }
}
