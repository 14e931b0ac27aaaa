//! Build manifest: what a successful build produced.

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Page,
    Chunk,
    Asset,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Page => "page",
            Self::Chunk => "chunk",
            Self::Asset => "asset",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Relative to the project root.
    pub source_path: PathBuf,
    /// Relative to the output directory.
    pub output_path: PathBuf,
    pub size_bytes: u64,
    pub kind: EntryKind,
}

/// Ordered pages, then chunks, then assets. Rebuilt on every build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildManifest {
    entries: Vec<ManifestEntry>,
}

impl BuildManifest {
    /// Sort pages by source path and chunks/assets by output path.
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        let mut entries = entries;
        entries.sort_by(|a, b| {
            a.kind.cmp(&b.kind).then_with(|| match a.kind {
                EntryKind::Page => a.source_path.cmp(&b.source_path),
                EntryKind::Chunk | EntryKind::Asset => a.output_path.cmp(&b.output_path),
            })
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
