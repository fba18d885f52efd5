//! Executable discovery across the configured binary directories.
//!
//! Each directory is listed non-recursively. Entries that are not
//! directories and that the current process may execute are collected by
//! file name into a sorted, de-duplicated set. Nothing in here is fatal: a
//! directory that is missing or cannot be listed is skipped and reported.

mod executable;

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use autodict_shared::CommandName;
use tracing::{debug, info, instrument, warn};

// ---------------------------------------------------------------------------
// DiscoveryResult
// ---------------------------------------------------------------------------

/// Outcome of scanning all configured directories.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    /// Unique command names, ascending.
    pub commands: BTreeSet<CommandName>,
    /// Directories that contributed nothing, and why.
    pub skipped: Vec<SkippedDirectory>,
}

impl DiscoveryResult {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A configured directory that was not scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDirectory {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Why a directory was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The path does not exist.
    Missing,
    /// Listing failed (permissions, not a directory, I/O).
    Unreadable(String),
}

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery process.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Directories to scan, in order.
    pub directories: Vec<PathBuf>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            directories: autodict_shared::DEFAULT_DIRECTORIES
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Scan every configured directory and collect executable names.
#[instrument(skip_all, fields(directories = opts.directories.len()))]
pub fn discover(opts: &DiscoveryOptions) -> DiscoveryResult {
    let mut result = DiscoveryResult::default();

    for dir in &opts.directories {
        match scan_directory(dir) {
            Ok(names) => {
                debug!(dir = %dir.display(), found = names.len(), "scanned directory");
                result.commands.extend(names);
            }
            Err(SkipReason::Missing) => {
                debug!(dir = %dir.display(), "directory does not exist, skipping");
                result.skipped.push(SkippedDirectory {
                    path: dir.clone(),
                    reason: SkipReason::Missing,
                });
            }
            Err(reason) => {
                warn!(dir = %dir.display(), ?reason, "directory could not be listed, skipping");
                result.skipped.push(SkippedDirectory {
                    path: dir.clone(),
                    reason,
                });
            }
        }
    }

    info!(
        commands = result.commands.len(),
        skipped = result.skipped.len(),
        "discovery complete"
    );

    result
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// List one directory. Any listing error discards the whole directory.
fn scan_directory(dir: &Path) -> std::result::Result<Vec<CommandName>, SkipReason> {
    let entries = std::fs::read_dir(dir).map_err(|e| skip_reason(&e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| skip_reason(&e))?;

        let Ok(name) = entry.file_name().into_string() else {
            debug!(dir = %dir.display(), "skipping non UTF-8 entry name");
            continue;
        };

        if executable::is_candidate(&entry.path()) {
            names.push(CommandName::new(name));
        }
    }

    Ok(names)
}

fn skip_reason(err: &io::Error) -> SkipReason {
    match err.kind() {
        io::ErrorKind::NotFound => SkipReason::Missing,
        _ => SkipReason::Unreadable(err.to_string()),
    }
}
