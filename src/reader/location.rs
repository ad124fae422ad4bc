//! Resolution of possibly-relative file references.

use std::path::{Component, Path, PathBuf};

use tracing::error;

/// Finds the absolute path of `fname`.
///
/// Tries `possible_rel_start/fname` first (when the start directory exists),
/// then `fname` relative to the working directory. When neither exists the
/// reference is returned unchanged and an error is logged; the caller may
/// still record it.
pub fn resolve_location(fname: &Path, possible_rel_start: Option<&Path>) -> PathBuf {
    if let Some(start) = possible_rel_start {
        let candidate = start.join(fname);
        if start.exists() && candidate.exists() {
            return absolute_path(&candidate);
        }
    }
    if fname.exists() {
        return absolute_path(fname);
    }
    error!("Including unresolved file: {}", fname.display());
    fname.to_path_buf()
}

/// Makes `path` absolute against the working directory and normalizes
/// `.` and `..` lexically. Symlinks are not resolved.
pub fn absolute_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// True for absolute filesystem paths and for references carrying a URI
/// scheme (`file:///...`, `xml:/...`).
pub fn is_absolute_reference(reference: &str) -> bool {
    if Path::new(reference).is_absolute() {
        return true;
    }
    match url::Url::parse(reference) {
        // Single letters are Windows drive prefixes, not schemes.
        Ok(url) => url.scheme().len() > 1,
        Err(_) => false,
    }
}
