//! Page bundling.
//!
//! The pipeline hands every discovered entry to a [`Bundler`] in one call.
//! [`NativeBundler`] is the in-process implementation: it minifies pages and
//! extracts their local scripts and stylesheets into content-named chunks.

mod minify;
mod naming;
mod native;
mod refs;

pub use naming::{DEFAULT_CHUNK_DIR, NamingPolicy};
pub use native::NativeBundler;

use crate::discovery::DiscoveredEntry;
use std::fmt;
use std::path::{Path, PathBuf};

/// Everything a bundler needs for one batch.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
    pub entries: &'a [DiscoveredEntry],
    /// Root that `/`-prefixed references resolve against, and that no
    /// reference may escape.
    pub asset_root: &'a Path,
    pub output_dir: &'a Path,
    pub minify: bool,
    pub naming: &'a NamingPolicy,
    /// Show a progress line while bundling.
    pub progress: bool,
}

/// One written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub source: PathBuf,
    pub output: PathBuf,
    pub size: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
    /// Primary outputs, in entry order.
    pub pages: Vec<OutputFile>,
    /// Deduplicated chunks, ordered by output path.
    pub chunks: Vec<OutputFile>,
}

/// A problem attributed to a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub message: String,
}

impl EntryFailure {
    pub fn new(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.entry, self.message)
    }
}

/// Every per-entry failure of a batch; nothing is written when this is returned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} bundle failure(s)", failures.len())]
pub struct BundleError {
    pub failures: Vec<EntryFailure>,
}

pub trait Bundler: Send + Sync {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<BundleOutput, BundleError>;
}
