//! Stage bodies. Each returns the failures that stop (or, for assets, are
//! reported by) the pipeline.

use super::manifest::{EntryKind, ManifestEntry};
use super::{BuildPipeline, StageResult};
use crate::bundle::{BundleRequest, EntryFailure, NamingPolicy};
use crate::discovery::{self, DiscoveredEntry};
use crate::utils::path::normalize_path;
use crate::{debug, hooks, log};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn failure(entry: &Path, message: impl Into<String>) -> Vec<EntryFailure> {
    vec![EntryFailure::new(entry.display().to_string(), message)]
}

// ============================================================================
// Clean
// ============================================================================

/// Empty the destination, creating it when absent.
pub(super) fn clean(pipeline: &BuildPipeline<'_>) -> StageResult {
    let output = pipeline.output_dir();
    let root = normalize_path(pipeline.site.get_root());
    let theme = normalize_path(&pipeline.theme.path);
    let target = normalize_path(output);

    if root.starts_with(&target) || theme.starts_with(&target) {
        return Err(failure(
            output,
            "refusing to clean: output directory contains the project or theme",
        ));
    }

    clear_dir(output).map_err(|e| failure(output, format!("cannot clean output: {e}")))
}

/// Remove every child of `dir`, keeping `dir` itself.
pub(super) fn clear_dir(dir: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "destination exists and is not a directory",
            ));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return fs::create_dir_all(dir),
        Err(e) => return Err(e),
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

// ============================================================================
// Styles
// ============================================================================

pub(super) fn styles(pipeline: &BuildPipeline<'_>) -> StageResult {
    match hooks::css::run_css(pipeline.site, pipeline.theme) {
        Ok(true) => Ok(()),
        Ok(false) => {
            debug!("build"; "no css toolchain configured, skipping styles");
            Ok(())
        }
        Err(e) => Err(vec![EntryFailure::new(
            pipeline.site.build.css.display_name(),
            format!("{e:#}"),
        )]),
    }
}

// ============================================================================
// Discover
// ============================================================================

pub(super) fn discover(pipeline: &BuildPipeline<'_>) -> Result<Vec<DiscoveredEntry>, Vec<EntryFailure>> {
    let pages = &pipeline.theme.pages_path;
    let found = discovery::discover_entries(pages)
        .map_err(|e| failure(pages, e.to_string()))?
        .sorted();

    for warning in &found.warnings {
        log!("warning"; "{warning}");
    }
    if found.is_empty() {
        log!("warning"; "no page entries found in {}", pipeline.site.root_relative(pages).display());
    }

    Ok(found.entries)
}

// ============================================================================
// Bundle
// ============================================================================

pub(super) fn bundle(
    pipeline: &BuildPipeline<'_>,
    entries: &[DiscoveredEntry],
) -> Result<Vec<ManifestEntry>, Vec<EntryFailure>> {
    let output_dir = pipeline.output_dir();
    let naming = NamingPolicy::default();
    let request = BundleRequest {
        entries,
        asset_root: &pipeline.theme.path,
        output_dir,
        minify: pipeline.site.build.minify,
        naming: &naming,
        progress: !pipeline.quiet,
    };

    let output = pipeline.bundler.bundle(&request).map_err(|e| e.failures)?;

    let pages = output.pages.into_iter().map(|f| (f, EntryKind::Page));
    let chunks = output.chunks.into_iter().map(|f| (f, EntryKind::Chunk));
    Ok(pages
        .chain(chunks)
        .map(|(file, kind)| ManifestEntry {
            source_path: pipeline.site.root_relative(&file.source),
            output_path: file
                .output
                .strip_prefix(output_dir)
                .map_or_else(|_| file.output.clone(), Path::to_path_buf),
            size_bytes: file.size,
            kind,
        })
        .collect())
}

// ============================================================================
// Assets
// ============================================================================

/// Copy `<theme assets>/<passthrough>` verbatim.
///
/// A missing source is expected for themes without decoration and is only
/// noted at debug level. Entries that were copied are kept even when others fail.
pub(super) fn assets(pipeline: &BuildPipeline<'_>, copied: &mut Vec<ManifestEntry>) -> StageResult {
    let passthrough = &pipeline.site.build.passthrough;
    let source = pipeline.theme.assets_path.join(passthrough);
    let dest = pipeline.output_dir().join(passthrough);

    if !source.is_dir() {
        debug!("build"; "no passthrough assets at {}", source.display());
        return Ok(());
    }

    let mut failures = Vec::new();
    for entry in WalkDir::new(&source).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(source.as_path()).to_path_buf();
                failures.extend(failure(&path, e.to_string()));
                continue;
            }
        };

        let Ok(rel) = entry.path().strip_prefix(&source) else {
            continue;
        };
        let target = dest.join(rel);

        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map(|()| None)
        } else {
            target
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|()| fs::copy(entry.path(), &target))
                .map(Some)
        };

        match result {
            Ok(Some(size)) => copied.push(ManifestEntry {
                source_path: pipeline.site.root_relative(entry.path()),
                output_path: passthrough.join(rel),
                size_bytes: size,
                kind: EntryKind::Asset,
            }),
            Ok(None) => {}
            Err(e) => failures.extend(failure(entry.path(), e.to_string())),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}
