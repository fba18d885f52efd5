//! Executable-permission checks for directory entries.

use std::path::Path;

/// Whether `path` should be catalogued: it is not a directory and the
/// current process may execute it. Symlinks are followed.
pub(crate) fn is_candidate(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if !meta.is_dir() => is_executable(path),
        _ => false,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use nix::unistd::{AccessFlags, access};

    access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    // No execute bit to consult; any regular file counts.
    path.is_file()
}
