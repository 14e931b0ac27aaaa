//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `is_within` - containment check after symlink resolution

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Check that `path` resolves to a location under `root`.
///
/// Both sides are canonicalized, so symlinks pointing out of `root` are
/// rejected. Returns the canonical path on success; `None` when either
/// path does not exist or the resolved path escapes.
pub fn is_within(path: &Path, root: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    canonical.starts_with(&root_canonical).then_some(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_is_within() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/a.html"), "a").unwrap();
        fs::write(dir.path().join("secret.html"), "s").unwrap();

        assert!(is_within(&root.join("sub/a.html"), &root).is_some());
        assert!(is_within(&root.join("sub/../../secret.html"), &root).is_none());
        assert!(is_within(&root.join("missing.html"), &root).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_is_within_rejects_symlink_escape() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::write(dir.path().join("secret.html"), "s").unwrap();
        std::os::unix::fs::symlink(dir.path().join("secret.html"), root.join("link.html")).unwrap();

        assert!(is_within(&root.join("link.html"), &root).is_none());
    }
}
