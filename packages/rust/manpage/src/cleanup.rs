//! Normalization passes applied to manual text before section parsing.
//!
//! Each pass is a function `&str -> String` applied in sequence. Together
//! they turn terminal-formatted output back into plain lines so header
//! detection does not depend on how the manual service was configured.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full normalization pipeline on raw manual output.
pub(crate) fn run_pipeline(text: &str) -> String {
    let mut result = normalize_line_endings(text);

    result = strip_overstrike(&result);
    result = strip_ansi_escapes(&result);
    result = trim_trailing_whitespace(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Line endings
// ---------------------------------------------------------------------------

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

// ---------------------------------------------------------------------------
// Pass 2: Overstrike
// ---------------------------------------------------------------------------

/// Remove nroff bold (`X\bX`) and underline (`_\bX`) sequences, keeping
/// the final character of each.
fn strip_overstrike(text: &str) -> String {
    static OVERSTRIKE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\n]\x08").expect("valid regex"));

    if !text.contains('\x08') {
        return text.to_string();
    }
    OVERSTRIKE_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: ANSI escapes
// ---------------------------------------------------------------------------

/// Remove CSI sequences such as SGR colour and bold codes.
fn strip_ansi_escapes(text: &str) -> String {
    static CSI_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid regex"));

    if !text.contains('\x1b') {
        return text.to_string();
    }
    CSI_RE.replace_all(text, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Trailing whitespace
// ---------------------------------------------------------------------------

fn trim_trailing_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_becomes_lf() {
        assert_eq!(normalize_line_endings("a\r\nb\r\n"), "a\nb\n");
    }

    #[test]
    fn bold_overstrike_collapses() {
        assert_eq!(strip_overstrike("N\x08NA\x08AM\x08ME\x08E"), "NAME");
    }

    #[test]
    fn underline_overstrike_collapses() {
        assert_eq!(strip_overstrike("_\x08f_\x08i_\x08l_\x08e"), "file");
    }

    #[test]
    fn plain_text_untouched_by_overstrike() {
        assert_eq!(strip_overstrike("ls - list"), "ls - list");
    }

    #[test]
    fn sgr_codes_removed() {
        let input = "\x1b[1mgrep\x1b[0m [\x1b[4mOPTION\x1b[24m...]";
        assert_eq!(strip_ansi_escapes(input), "grep [OPTION...]");
    }

    #[test]
    fn trailing_whitespace_trimmed_per_line() {
        assert_eq!(trim_trailing_whitespace("NAME   \n  body \t\n"), "NAME\n  body");
    }

    #[test]
    fn full_pipeline_restores_plain_headers() {
        let raw = "N\x08NA\x08AM\x08ME\x08E\r\n       \x1b[1mfoo\x1b[0m - does a thing  \r\n\r\n";
        let cleaned = run_pipeline(raw);
        assert_eq!(cleaned, "NAME\n       foo - does a thing\n");
    }
}
