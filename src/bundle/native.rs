//! In-process bundler.
//!
//! Entries are processed in parallel with rayon; results are collected in
//! entry order, so output bytes and names depend only on input bytes.
//! Nothing is written until every entry has bundled cleanly.

use super::minify::minify_by_ext;
use super::refs::{AssetRef, RefKind, rewrite_refs};
use super::{BundleError, BundleOutput, BundleRequest, Bundler, EntryFailure, OutputFile};
use crate::discovery::DiscoveredEntry;
use crate::logger::ProgressLine;
use crate::utils::{html, path::is_within};
use percent_encoding::percent_decode_str;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBundler;

struct Chunk {
    name: String,
    source: PathBuf,
    content: String,
}

struct BundledPage {
    name: String,
    source: PathBuf,
    html: String,
    chunks: Vec<Chunk>,
}

impl Bundler for NativeBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<BundleOutput, BundleError> {
        let mut failures = duplicate_name_failures(request);
        let blocked: Vec<&str> = failures.iter().map(|f| f.entry.as_str()).collect();

        let progress = request
            .progress
            .then(|| ProgressLine::new(&[("pages", request.entries.len())]));

        let results: Vec<Result<BundledPage, Vec<EntryFailure>>> = request
            .entries
            .par_iter()
            .filter(|entry| !blocked.contains(&entry.relative_path.as_str()))
            .map(|entry| {
                let result = bundle_entry(entry, request);
                if let Some(progress) = &progress {
                    progress.inc("pages");
                }
                result
            })
            .collect();

        if let Some(progress) = progress {
            progress.finish();
        }

        let mut pages = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(page) => pages.push(page),
                Err(errs) => failures.extend(errs),
            }
        }

        if !failures.is_empty() {
            return Err(BundleError { failures });
        }

        write_output(request.output_dir, pages)
    }
}

/// Entries whose base names collide would overwrite each other in the flat
/// output, so every member of a colliding group fails.
fn duplicate_name_failures(request: &BundleRequest<'_>) -> Vec<EntryFailure> {
    let mut by_name: FxHashMap<String, Vec<&DiscoveredEntry>> = FxHashMap::default();
    for entry in request.entries {
        by_name
            .entry(request.naming.primary(entry).to_ascii_lowercase())
            .or_default()
            .push(entry);
    }

    let mut failures = Vec::new();
    for entry in request.entries {
        let group = &by_name[&request.naming.primary(entry).to_ascii_lowercase()];
        if group.len() > 1 {
            let others: Vec<_> = group
                .iter()
                .filter(|e| e.relative_path != entry.relative_path)
                .map(|e| format!("`{}`", e.relative_path))
                .collect();
            failures.push(EntryFailure::new(
                &entry.relative_path,
                format!(
                    "output name `{}` is also produced by {}",
                    request.naming.primary(entry),
                    others.join(", ")
                ),
            ));
        }
    }
    failures
}

fn bundle_entry(
    entry: &DiscoveredEntry,
    request: &BundleRequest<'_>,
) -> Result<BundledPage, Vec<EntryFailure>> {
    let fail = |message: String| EntryFailure::new(&entry.relative_path, message);

    let source = fs::read_to_string(&entry.absolute_path)
        .map_err(|e| vec![fail(format!("cannot read entry: {e}"))])?;

    let source = if request.minify {
        html::minify(&source)
    } else {
        source
    };

    let mut errors = Vec::new();
    let mut chunks: Vec<Chunk> = Vec::new();

    let page = rewrite_refs(&source, |asset| {
        match load_chunk(asset, entry, request) {
            Ok(chunk) => {
                let name = chunk.name.clone();
                if !chunks.iter().any(|c| c.name == chunk.name) {
                    chunks.push(chunk);
                }
                Some(name)
            }
            Err(message) => {
                errors.push(fail(message));
                None
            }
        }
    });

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BundledPage {
        name: request.naming.primary(entry).to_string(),
        source: entry.absolute_path.clone(),
        html: page,
        chunks,
    })
}

fn load_chunk(
    asset: &AssetRef,
    entry: &DiscoveredEntry,
    request: &BundleRequest<'_>,
) -> Result<Chunk, String> {
    let path = resolve_ref(asset, entry, request.asset_root)?;

    let raw = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read `{}`: {e}", asset.url))?;

    let module = matches!(asset.kind, RefKind::Script { module: true });
    let content = if request.minify {
        minify_by_ext(&path, &raw, module).map_err(|e| format!("`{}`: {e}", asset.url))?
    } else {
        raw
    };

    Ok(Chunk {
        name: request.naming.chunk(&path, content.as_bytes()),
        source: path,
        content,
    })
}

/// `/x` resolves against the asset root, anything else against the entry's
/// directory. The result must exist and stay inside the asset root.
fn resolve_ref(asset: &AssetRef, entry: &DiscoveredEntry, asset_root: &Path) -> Result<PathBuf, String> {
    let decoded = percent_decode_str(asset.path()).decode_utf8_lossy();

    let candidate = match decoded.strip_prefix('/') {
        Some(rooted) => asset_root.join(rooted),
        None => entry
            .absolute_path
            .parent()
            .unwrap_or(asset_root)
            .join(&*decoded),
    };

    if !candidate.is_file() {
        return Err(format!("referenced file `{}` not found", asset.url));
    }

    is_within(&candidate, asset_root)
        .ok_or_else(|| format!("reference `{}` points outside the theme", asset.url))
}

fn write_output(output_dir: &Path, pages: Vec<BundledPage>) -> Result<BundleOutput, BundleError> {
    let mut failures = Vec::new();
    let mut chunks: BTreeMap<String, Chunk> = BTreeMap::new();
    let mut written_pages = Vec::with_capacity(pages.len());

    for page in pages {
        let output = output_dir.join(&page.name);
        match fs::write(&output, &page.html) {
            Ok(()) => written_pages.push(OutputFile {
                source: page.source,
                output,
                size: page.html.len() as u64,
            }),
            Err(e) => failures.push(EntryFailure::new(
                output.display().to_string(),
                format!("cannot write page: {e}"),
            )),
        }
        for chunk in page.chunks {
            chunks.entry(chunk.name.clone()).or_insert(chunk);
        }
    }

    let mut written_chunks = Vec::with_capacity(chunks.len());
    for (name, chunk) in chunks {
        let output = output_dir.join(&name);
        let written = output
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&output, &chunk.content));
        match written {
            Ok(()) => written_chunks.push(OutputFile {
                source: chunk.source,
                output,
                size: chunk.content.len() as u64,
            }),
            Err(e) => failures.push(EntryFailure::new(name, format!("cannot write chunk: {e}"))),
        }
    }

    if !failures.is_empty() {
        return Err(BundleError { failures });
    }

    Ok(BundleOutput {
        pages: written_pages,
        chunks: written_chunks,
    })
}
