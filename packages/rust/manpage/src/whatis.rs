//! One-line summary parsing (`whatis`-style output).
//!
//! Expected shape: `<name> (<section>) - <summary>`. Only the first output
//! line is considered; the summary is everything after its first ` - `.

use autodict_shared::{Lookup, Unavailable};

/// The separator between the name/section column and the summary.
const SUMMARY_SEPARATOR: &str = " - ";

/// The "no entry" message, matched case-insensitively.
const NOTHING_APPROPRIATE: &str = "nothing appropriate";

/// Parse summary-service output into a description.
pub fn parse_summary(output: &str) -> Lookup {
    let trimmed = output.trim();

    if trimmed.is_empty() {
        return Lookup::Unavailable(Unavailable::Empty);
    }
    if trimmed.to_lowercase().contains(NOTHING_APPROPRIATE) {
        return Lookup::Unavailable(Unavailable::NothingAppropriate);
    }

    let first_line = trimmed.lines().next().unwrap_or_default();
    match first_line.split_once(SUMMARY_SEPARATOR) {
        Some((_, summary)) if !summary.trim().is_empty() => {
            Lookup::Found(summary.trim().to_string())
        }
        _ => Lookup::Malformed(format!("no \"{SUMMARY_SEPARATOR}\" separator in summary line")),
    }
}
