//! Parsing of documentation-service output into dictionary fields.
//!
//! Two shapes are handled:
//! - one-line summaries (`ls (1) - list directory contents`), see
//!   [`parse_summary`];
//! - full manual pages with ALL-CAPS section headers followed by indented,
//!   blank-line-terminated bodies, see [`ManualPage`].
//!
//! Parsing never fails hard. Missing or odd input comes back as
//! [`Lookup::Malformed`] or [`Lookup::Unavailable`] so callers can fall back.

mod cleanup;
mod sections;
mod whatis;

use autodict_shared::{CommandName, Lookup};
use tracing::trace;

pub use whatis::parse_summary;

/// Header of the one-line description section.
const NAME_HEADER: &str = "NAME";

/// Header of the usage section.
const SYNOPSIS_HEADER: &str = "SYNOPSIS";

// ---------------------------------------------------------------------------
// ManualPage
// ---------------------------------------------------------------------------

/// A manual page normalized to plain text, ready for section queries.
#[derive(Debug, Clone)]
pub struct ManualPage {
    text: String,
}

impl ManualPage {
    /// Normalize raw manual output (line endings, overstrike, escapes).
    pub fn parse(raw: &str) -> Self {
        let text = cleanup::run_pipeline(raw);
        trace!(raw_len = raw.len(), clean_len = text.len(), "manual normalized");
        Self { text }
    }

    /// The NAME section body joined into one line.
    pub fn name_section(&self) -> Lookup {
        match sections::section_body(&self.text, NAME_HEADER) {
            None => Lookup::Malformed("no NAME section".into()),
            Some(lines) if lines.is_empty() => Lookup::Malformed("empty NAME section".into()),
            Some(lines) => Lookup::Found(lines.join(" ")),
        }
    }

    /// The first SYNOPSIS line that starts with `name`, if any.
    pub fn synopsis_example(&self, name: &CommandName) -> Option<String> {
        sections::section_body(&self.text, SYNOPSIS_HEADER)?
            .into_iter()
            .find(|line| line.starts_with(name.as_str()))
            .map(str::to_string)
    }
}
