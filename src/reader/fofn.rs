//! File-of-file-names manifests.
//!
//! One reference per line. Each line is trimmed; blank lines are skipped.
//! A line naming an existing file (relative to the working directory) is
//! made absolute, anything else is taken relative to the manifest's own
//! directory without further checks.

use std::fs;
use std::path::{Path, PathBuf};

use super::location::absolute_path;
use crate::error::DataSetError;

/// Reads a manifest file and returns the references it lists.
pub fn open_fofn_file(path: &Path) -> Result<Vec<PathBuf>, DataSetError> {
    let contents = fs::read_to_string(path).map_err(DataSetError::Io)?;
    let manifest_dir = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parse_fofn_str(&contents, manifest_dir))
}

/// Resolves the lines of a manifest whose directory is `manifest_dir`.
pub fn parse_fofn_str(contents: &str, manifest_dir: &Path) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let candidate = absolute_path(Path::new(line));
            if candidate.exists() {
                candidate
            } else {
                manifest_dir.join(line)
            }
        })
        .collect()
}
