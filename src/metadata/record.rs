// src/metadata/record.rs

use std::collections::BTreeMap;
use std::fmt;

/// Capability for depositing extracted metadata values.
pub trait MetadataSink {
    /// Append one value to `field`, keeping earlier values.
    fn add(&mut self, field: &str, value: String);
}

/// Capability for depositing extracted text.
pub trait TextSink {
    /// Replace the sink's content with the full captured text.
    fn set_text(&mut self, text: String);
}

impl TextSink for String {
    fn set_text(&mut self, text: String) {
        *self = text;
    }
}

/// Multi-valued metadata record.
///
/// Fields are kept in name order; values within a field keep insertion
/// order. A field only exists once it has at least one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    fields: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values(field).first().map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Append every value of this record to `sink`.
    pub fn merge_into(&self, sink: &mut dyn MetadataSink) {
        for (field, values) in &self.fields {
            for value in values {
                sink.add(field, value.clone());
            }
        }
    }
}

impl MetadataSink for Metadata {
    fn add(&mut self, field: &str, value: String) {
        self.fields.entry(field.to_string()).or_default().push(value);
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, values) in &self.fields {
            for value in values {
                writeln!(f, "{field}: {value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_accumulate_per_field() {
        let mut md = Metadata::new();
        md.add("duration", "1".to_string());
        md.add("duration", "2".to_string());
        md.add("codec", "h264".to_string());

        assert_eq!(md.len(), 2);
        assert_eq!(md.values("duration"), ["1", "2"]);
        assert_eq!(md.get("codec"), Some("h264"));
        assert!(md.values("missing").is_empty());
        assert_eq!(md.to_string(), "codec: h264\nduration: 1\nduration: 2\n");
    }

    #[test]
    fn merge_into_appends_to_existing_sink() {
        let mut src = Metadata::new();
        src.add("a", "x".to_string());
        let mut dst = Metadata::new();
        dst.add("a", "first".to_string());

        src.merge_into(&mut dst);

        assert_eq!(dst.values("a"), ["first", "x"]);
    }
}
