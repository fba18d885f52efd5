//! Section extraction for plain-text manual pages.
//!
//! A section starts at a line whose trimmed, upper-cased content equals the
//! header (e.g. `NAME`) and runs until the first blank line. The scan is a
//! two-state machine so each transition can be tested on its own.

/// Parser state while walking the manual line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for the header line.
    Scanning,
    /// Past the header, collecting body lines.
    InSection,
}

/// Whether `line` is the header for `header` (already upper-case).
fn is_header(line: &str, header: &str) -> bool {
    line.trim().to_uppercase() == header
}

/// Trimmed body lines of the first section titled `header`.
///
/// Returns `None` when the header never appears. A header line repeated
/// inside the body is skipped rather than collected.
pub(crate) fn section_body<'a>(text: &'a str, header: &str) -> Option<Vec<&'a str>> {
    let mut state = State::Scanning;
    let mut body = Vec::new();

    for line in text.lines() {
        match state {
            State::Scanning => {
                if is_header(line, header) {
                    state = State::InSection;
                }
            }
            State::InSection => {
                if is_header(line, header) {
                    continue;
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    break;
                }
                body.push(trimmed);
            }
        }
    }

    match state {
        State::Scanning => None,
        State::InSection => Some(body),
    }
}
