//! URL to filesystem path resolution.

use crate::bundle::DEFAULT_CHUNK_DIR;
use crate::discovery::PAGE_EXTENSION;
use crate::utils::path::{is_lexically_safe, is_within, to_slash};
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// What the serve root holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// Theme page sources.
    Source,
    /// Build output.
    Built,
}

impl std::fmt::Display for ServeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Source => "source pages",
            Self::Built => "build output",
        })
    }
}

/// Which files under the serve root may be sent.
#[derive(Debug, Clone)]
pub struct ServeAccess {
    mode: ServeMode,
    /// Slash path of the passthrough directory inside the output.
    passthrough: String,
}

impl ServeAccess {
    pub fn new(mode: ServeMode, passthrough: &Path) -> Self {
        Self {
            mode,
            passthrough: to_slash(passthrough).unwrap_or_default(),
        }
    }

    pub const fn mode(&self) -> ServeMode {
        self.mode
    }

    /// `relative` is the slash path of a file under the serve root.
    pub fn allows(&self, relative: &str) -> bool {
        let ext = relative
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if ext == PAGE_EXTENSION {
            return true;
        }
        match self.mode {
            ServeMode::Source => false,
            ServeMode::Built => {
                let chunk = relative
                    .strip_prefix(DEFAULT_CHUNK_DIR)
                    .is_some_and(|rest| rest.starts_with('/'))
                    && matches!(ext.as_str(), "css" | "js");
                let passthrough = !self.passthrough.is_empty()
                    && relative
                        .strip_prefix(self.passthrough.as_str())
                        .is_some_and(|rest| rest.starts_with('/'));
                chunk || passthrough
            }
        }
    }
}

/// Percent-decode a request path. `None` when the bytes are not UTF-8.
pub fn decode_path(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Resolve a decoded URL path to a servable file under `serve_root`.
///
/// Lexical `..` is rejected before touching the filesystem; the canonical
/// target (after symlinks) must stay inside the canonical root. A directory
/// resolves to its `index.html`.
pub fn resolve_file(decoded: &str, serve_root: &Path, access: &ServeAccess) -> Option<PathBuf> {
    let clean = decoded.trim_matches('/');
    if clean.is_empty() || !is_lexically_safe(clean) {
        return None;
    }

    let mut canonical = is_within(&serve_root.join(clean), serve_root)?;
    if canonical.is_dir() {
        canonical = is_within(&canonical.join("index.html"), serve_root)?;
    }
    if !canonical.is_file() {
        return None;
    }

    let root = serve_root.canonicalize().ok()?;
    let relative = to_slash(canonical.strip_prefix(&root).ok()?)?;
    access.allows(&relative).then_some(canonical)
}

/// Last segment of a URL path has no extension.
pub fn is_extensionless(decoded: &str) -> bool {
    decoded
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(|segment| !segment.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join("assets")).unwrap();
        fs::create_dir_all(root.join("icons")).unwrap();
        fs::write(root.join("a.html"), "a").unwrap();
        fs::write(root.join("sub/index.html"), "i").unwrap();
        fs::write(root.join("notes.txt"), "t").unwrap();
        fs::write(root.join("assets/app-1234abcd.js"), "js").unwrap();
        fs::write(root.join("icons/logo.svg"), "svg").unwrap();
        fs::write(dir.path().join("secret.html"), "s").unwrap();
        dir
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/a%20b.html").as_deref(), Some("/a b.html"));
        assert_eq!(decode_path("/%2e%2e/x").as_deref(), Some("/../x"));
        assert!(decode_path("/%ff").is_none());
    }

    #[test]
    fn test_source_mode_serves_pages_only() {
        let dir = tree();
        let root = dir.path().join("root");
        let access = ServeAccess::new(ServeMode::Source, Path::new("icons"));

        assert!(resolve_file("/a.html", &root, &access).is_some());
        assert!(resolve_file("/sub/", &root, &access).unwrap().ends_with("sub/index.html"));
        assert!(resolve_file("/notes.txt", &root, &access).is_none());
        assert!(resolve_file("/assets/app-1234abcd.js", &root, &access).is_none());
        assert!(resolve_file("/missing.html", &root, &access).is_none());
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = tree();
        let root = dir.path().join("root");
        let access = ServeAccess::new(ServeMode::Source, Path::new("icons"));

        assert!(resolve_file("/../secret.html", &root, &access).is_none());
        assert!(resolve_file("/sub/../../secret.html", &root, &access).is_none());
        assert!(resolve_file("/sub/..\\..\\secret.html", &root, &access).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let dir = tree();
        let root = dir.path().join("root");
        std::os::unix::fs::symlink(dir.path().join("secret.html"), root.join("leak.html")).unwrap();
        let access = ServeAccess::new(ServeMode::Source, Path::new("icons"));

        assert!(resolve_file("/leak.html", &root, &access).is_none());
    }

    #[test]
    fn test_built_mode_serves_chunks_and_passthrough() {
        let dir = tree();
        let root = dir.path().join("root");
        let access = ServeAccess::new(ServeMode::Built, Path::new("icons"));

        assert!(resolve_file("/assets/app-1234abcd.js", &root, &access).is_some());
        assert!(resolve_file("/icons/logo.svg", &root, &access).is_some());
        assert!(resolve_file("/notes.txt", &root, &access).is_none());
    }

    #[test]
    fn test_is_extensionless() {
        assert!(is_extensionless("/about"));
        assert!(is_extensionless("/blog/"));
        assert!(!is_extensionless("/a.html"));
        assert!(!is_extensionless("/v1.2/notes.html"));
    }
}
