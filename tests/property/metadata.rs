// tests/property/metadata.rs

use proptest::prelude::*;
use extparse::metadata::{extract_metadata, ExtractionPatterns};

// Literal single-letter patterns so match counts are easy to compute.
fn letter_pattern(c: char, grouped: bool) -> String {
    if grouped { format!("({c}+)") } else { format!("{c}+") }
}

fn count_runs(text: &str, c: char) -> usize {
    let mut count = 0;
    let mut in_run = false;
    for ch in text.chars() {
        if ch == c {
            if !in_run {
                count += 1;
            }
            in_run = true;
        } else {
            in_run = false;
        }
    }
    count
}

proptest! {
    /// N patterns feeding one field yield the sum of their match counts.
    #[test]
    fn same_field_value_count_is_sum_of_matches(
        text in "[abc \n]{0,200}",
        letters in proptest::collection::vec(prop_oneof![Just('a'), Just('b'), Just('c')], 1..6),
        grouped in any::<bool>(),
    ) {
        let mut patterns = ExtractionPatterns::new();
        for c in &letters {
            patterns.add(&letter_pattern(*c, grouped), "runs").unwrap();
        }

        let md = extract_metadata(&text, &patterns);

        let expected: usize = letters.iter().map(|c| count_runs(&text, *c)).sum();
        prop_assert_eq!(md.values("runs").len(), expected);
        if expected == 0 {
            prop_assert!(md.is_empty());
        }
    }

    /// Grouped and ungrouped forms of a pattern produce identical values
    /// when the group spans the whole match.
    #[test]
    fn group_and_whole_match_agree_for_full_span_groups(text in "[ab ]{0,120}") {
        let grouped = ExtractionPatterns::new().with("(a+)", "x").unwrap();
        let plain = ExtractionPatterns::new().with("a+", "x").unwrap();
        prop_assert_eq!(
            extract_metadata(&text, &grouped),
            extract_metadata(&text, &plain)
        );
    }

    /// Values come from group 1 only, never from surrounding context.
    #[test]
    fn group_value_excludes_context(n in 0u32..100_000) {
        let text = format!("bitrate: {n} kb/s");
        let patterns = ExtractionPatterns::new().with(r"bitrate: (\d+) kb/s", "bitrate").unwrap();
        let md = extract_metadata(&text, &patterns);
        let expected = n.to_string();
        prop_assert_eq!(md.get("bitrate"), Some(expected.as_str()));
    }
}
