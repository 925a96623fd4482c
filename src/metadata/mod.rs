// src/metadata/mod.rs

//! Regex-driven metadata extraction.
//!
//! - [`patterns`] holds the compiled pattern → field table.
//! - [`record`] holds the multi-valued [`Metadata`] record.
//! - [`extract`] is the pure function `(text, patterns) -> Metadata`. It does
//!   no IO, so it can be tested against literal text fixtures.

pub mod extract;
pub mod patterns;
pub mod record;

pub use extract::{extract_into, extract_metadata};
pub use patterns::ExtractionPatterns;
pub use record::Metadata;
