//! Output naming policy.
//!
//! Primary pages keep the entry's base name at the output root. Chunks are
//! named `<chunk_dir>/<stem>-<hash8>.<ext>` from their final bytes, so
//! identical content always maps to the same file.

use crate::discovery::DiscoveredEntry;
use crate::utils::hash::fingerprint;
use std::path::Path;

pub const DEFAULT_CHUNK_DIR: &str = "assets";

#[derive(Debug, Clone)]
pub struct NamingPolicy {
    pub chunk_dir: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self {
            chunk_dir: DEFAULT_CHUNK_DIR.into(),
        }
    }
}

impl NamingPolicy {
    /// `sub/b.html` → `b.html`
    pub fn primary<'a>(&self, entry: &'a DiscoveredEntry) -> &'a str {
        entry.file_name()
    }

    /// Slash-separated chunk path relative to the output root.
    pub fn chunk(&self, source: &Path, content: &[u8]) -> String {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let hash = fingerprint(content);
        match source.extension() {
            Some(ext) => format!("{}/{stem}-{hash}.{}", self.chunk_dir, ext.to_string_lossy()),
            None => format!("{}/{stem}-{hash}", self.chunk_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_primary_keeps_base_name() {
        let entry = DiscoveredEntry {
            absolute_path: PathBuf::from("/t/html/sub/b.html"),
            relative_path: "sub/b.html".into(),
        };
        assert_eq!(NamingPolicy::default().primary(&entry), "b.html");
    }

    #[test]
    fn test_chunk_name_is_content_derived() {
        let naming = NamingPolicy::default();
        let a = naming.chunk(Path::new("/t/app.js"), b"x=1");
        let b = naming.chunk(Path::new("/other/app.js"), b"x=1");
        let c = naming.chunk(Path::new("/t/app.js"), b"x=2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("assets/app-"));
        assert!(a.ends_with(".js"));
        assert_eq!(a.len(), "assets/app-".len() + 8 + ".js".len());
    }
}
