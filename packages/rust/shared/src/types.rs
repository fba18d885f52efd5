//! Core domain types for autodict dictionaries.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CommandName
// ---------------------------------------------------------------------------

/// File name of a discovered executable (never a full path).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandName(String);

impl CommandName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Example used when no SYNOPSIS line can be found.
    pub fn help_example(&self) -> String {
        format!("{} --help", self.0)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CommandName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// DictionaryEntry
// ---------------------------------------------------------------------------

/// One record of the output dictionary.
///
/// Field order here is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// The command name.
    pub title: CommandName,
    /// Short human-readable description; never empty.
    pub description: String,
    /// A representative invocation; never empty.
    pub example: String,
    /// Fixed tag vocabulary shared by every entry.
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Outcome of one documentation lookup (or of parsing its output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Usable, non-empty text.
    Found(String),
    /// The service produced nothing usable.
    Unavailable(Unavailable),
    /// The service produced output, but not in the expected shape.
    Malformed(String),
}

impl Lookup {
    /// Wrap `text` as `Found`, or `Unavailable(Empty)` when it is blank.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Unavailable(Unavailable::Empty)
        } else {
            Self::Found(text)
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found(text) => Some(text),
            _ => None,
        }
    }

    /// Feed found text through a parser; other outcomes pass through.
    pub fn and_then(self, f: impl FnOnce(String) -> Lookup) -> Lookup {
        match self {
            Self::Found(text) => f(text),
            other => other,
        }
    }
}

/// Why a lookup yielded no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The service binary is not installed.
    NotInstalled,
    /// The service could not be spawned or waited on.
    Spawn(String),
    /// The service exited unsuccessfully (`None` when killed by a signal).
    Exit(Option<i32>),
    /// The service did not finish within the lookup timeout.
    TimedOut(Duration),
    /// The service printed nothing.
    Empty,
    /// The service reported that it has nothing for this name.
    NothingAppropriate,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => f.write_str("service not installed"),
            Self::Spawn(e) => write!(f, "spawn failed: {e}"),
            Self::Exit(Some(code)) => write!(f, "exited with status {code}"),
            Self::Exit(None) => f.write_str("terminated by signal"),
            Self::TimedOut(after) => write!(f, "timed out after {}ms", after.as_millis()),
            Self::Empty => f.write_str("empty output"),
            Self::NothingAppropriate => f.write_str("nothing appropriate"),
        }
    }
}
