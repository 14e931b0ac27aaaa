//! Page entry discovery.
//!
//! Recursively walks a directory and yields every page entry (by extension)
//! together with its slash-normalized path relative to the walk root.
//!
//! Problems below the root never abort the walk: symlink cycles, unreadable
//! directories and unrepresentable names become [`DiscoveryWarning`]s.
//! Only a missing or unreadable root is a [`DiscoveryError`].

use crate::utils::path::{normalize_path, to_slash};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extension of page entries.
pub const PAGE_EXTENSION: &str = "html";

const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscoveredEntry {
    pub absolute_path: PathBuf,
    /// `/`-joined, never contains `..`.
    pub relative_path: String,
}

impl DiscoveredEntry {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read discovery root `{}`", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("discovery root `{}` is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

/// One item of a walk.
#[derive(Debug, Clone)]
pub enum Found {
    Entry(DiscoveredEntry),
    Warning(DiscoveryWarning),
}

/// Collected result of a full walk.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub entries: Vec<DiscoveredEntry>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sort entries by relative path for deterministic reporting.
    pub fn sorted(mut self) -> Self {
        self.entries
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        self
    }
}

impl FromIterator<Found> for Discovery {
    fn from_iter<I: IntoIterator<Item = Found>>(iter: I) -> Self {
        let mut discovery = Self::default();
        for found in iter {
            match found {
                Found::Entry(entry) => discovery.entries.push(entry),
                Found::Warning(warning) => discovery.warnings.push(warning),
            }
        }
        discovery
    }
}

/// Lazy walk over a directory tree.
///
/// Created by [`walk_entries`]. Each call starts a fresh traversal, so the
/// same root can be walked any number of times.
pub struct Entries {
    root: PathBuf,
    extensions: Vec<String>,
    inner: walkdir::IntoIter,
}

impl Iterator for Entries {
    type Item = Found;

    fn next(&mut self) -> Option<Found> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Found::Warning(walk_warning(&self.root, e))),
            };

            if !entry.file_type().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let path = entry.into_path();
            let relative = path
                .strip_prefix(&self.root)
                .ok()
                .and_then(to_slash)
                .filter(|rel| !rel.is_empty());

            return Some(match relative {
                Some(relative_path) => Found::Entry(DiscoveredEntry {
                    absolute_path: path,
                    relative_path,
                }),
                None => Found::Warning(DiscoveryWarning {
                    path,
                    reason: "path cannot be expressed relative to the root".into(),
                }),
            });
        }
    }
}

impl Entries {
    fn matches(&self, path: &Path) -> bool {
        let name = path.file_name().and_then(OsStr::to_str).unwrap_or_default();
        if IGNORED_FILES.contains(&name) {
            return false;
        }
        path.extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }
}

fn walk_warning(root: &Path, err: walkdir::Error) -> DiscoveryWarning {
    let path = err.path().unwrap_or(root).to_path_buf();
    let reason = match err.loop_ancestor() {
        Some(ancestor) => format!("symlink cycle back to `{}`", ancestor.display()),
        None => err
            .io_error()
            .map_or_else(|| err.to_string(), ToString::to_string),
    };
    DiscoveryWarning { path, reason }
}

/// Start a lazy walk for files with any of `extensions` under `root`.
///
/// The root is checked eagerly: it must exist, be a directory, and be
/// listable. Symlinks below it are followed.
pub fn walk_entries(root: &Path, extensions: &[&str]) -> Result<Entries, DiscoveryError> {
    let root_err = |source| DiscoveryError::Root {
        path: root.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(root).map_err(root_err)?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    fs::read_dir(root).map_err(root_err)?;

    let root = normalize_path(root);
    let inner = WalkDir::new(&root).follow_links(true).into_iter();

    Ok(Entries {
        root,
        extensions: extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect(),
        inner,
    })
}

/// Collect every page entry under `root`.
pub fn discover_entries(root: &Path) -> Result<Discovery, DiscoveryError> {
    discover_entries_with(root, &[PAGE_EXTENSION])
}

pub fn discover_entries_with(root: &Path, extensions: &[&str]) -> Result<Discovery, DiscoveryError> {
    Ok(walk_entries(root, extensions)?.collect())
}
