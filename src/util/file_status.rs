//! File status queries.
//!
//! - [`is_reg_file`]  — true if a path refers to a regular file
//! - [`is_directory`] — true if a path refers to a directory
//!
//! The teacher's `util::file_status` also covers `fstat`-based fd queries
//! and `set_file_stat` (mtime/ownership/permission preservation for
//! compressed-output files); neither has a counterpart here since kmerc
//! only ever creates a fresh output file via `KmerTable::write_out` and
//! never needs to mirror an input file's attributes onto it.

use std::fs;
use std::path::Path;

/// Returns `true` if `path` refers to a regular file.
///
/// Returns `false` for directories, symlinks, special files, and paths that
/// do not exist. Symlinks are not followed — the link itself is examined.
pub fn is_reg_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Returns `true` if `path` refers to a directory.
///
/// Returns `false` for regular files, symlinks, special files, and paths that
/// do not exist.
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.file_type().is_dir())
        .unwrap_or(false)
}
