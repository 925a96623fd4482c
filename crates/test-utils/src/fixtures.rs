//! Text fixtures shaped like media-probe output.

/// Pattern for a `Duration: HH:MM:SS.f, ` line.
pub const DURATION_PATTERN: &str = r"Duration: (\d+:\d+:\d+\.?\d?\d?), ";

/// Pattern matching each run of `a`s.
pub const DATA_RATE_PATTERN: &str = "(a+)";

/// Number of `(a+)` matches in [`duration_fixture`].
pub const DATA_RATE_MATCHES: usize = 311;

/// A duration line followed by `a` tokens.
///
/// The `a` in `Duration` is itself a match, so the body holds one token less
/// than [`DATA_RATE_MATCHES`].
pub fn duration_fixture() -> String {
    let mut text = String::from("Duration: 00:00:01.0, \n");
    for i in 0..DATA_RATE_MATCHES - 1 {
        text.push('a');
        text.push(if i % 20 == 19 { '\n' } else { ' ' });
    }
    text.push('\n');
    text
}
