// src/metadata/extract.rs

use crate::metadata::patterns::ExtractionPatterns;
use crate::metadata::record::{Metadata, MetadataSink};

/// Apply every pattern to `text` and collect the matches into a new record.
pub fn extract_metadata(text: &str, patterns: &ExtractionPatterns) -> Metadata {
    let mut metadata = Metadata::new();
    extract_into(text, patterns, &mut metadata);
    metadata
}

/// Apply every pattern to `text`, appending one value per match to `sink`.
///
/// Each pattern scans the whole text for non-overlapping matches. The value
/// is capture group 1 when the pattern has one (empty if the group did not
/// participate), otherwise the whole match. Values follow match order within
/// a pattern, then pattern order.
pub fn extract_into(text: &str, patterns: &ExtractionPatterns, sink: &mut dyn MetadataSink) {
    for (regex, field) in patterns.iter() {
        if regex.captures_len() > 1 {
            for caps in regex.captures_iter(text) {
                let value = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                sink.add(field, value.to_string());
            }
        } else {
            for m in regex.find_iter(text) {
                sink.add(field, m.as_str().to_string());
            }
        }
    }
}
