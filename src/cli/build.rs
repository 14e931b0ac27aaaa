//! `build` command: run the pipeline and report.

use crate::pipeline::{BuildError, BuildManifest, BuildPipeline, EntryKind};
use crate::theme::ResolvedSite;
use crate::{log, logger};
use crate::utils::plural_count;
use anyhow::{Context, Result, anyhow};

pub fn build_site(resolved: &ResolvedSite, json: bool, quiet: bool) -> Result<BuildManifest> {
    let ResolvedSite { site, theme } = resolved;
    if json {
        logger::set_stderr(true);
    }

    if !quiet && !json {
        log!("build"; "theme `{}` → {}", theme.name, site.root_relative(&site.build.output).display());
    }

    let manifest = BuildPipeline::new(site, theme)
        .quiet(quiet || json)
        .build()
        .map_err(|e| {
            report_failure(&e);
            anyhow!(e)
        })?;

    if json {
        let out = serde_json::to_string_pretty(&manifest).context("failed to serialize manifest")?;
        println!("{out}");
    } else if !quiet {
        print_manifest(&manifest);
    }

    Ok(manifest)
}

fn report_failure(error: &BuildError) {
    log!("error"; "{error}");
    for failure in &error.failures {
        log!("error"; "  {failure}");
    }
}

fn print_manifest(manifest: &BuildManifest) {
    if manifest.is_empty() {
        log!("done"; "nothing to build");
        return;
    }

    for entry in manifest.entries() {
        println!(
            "  {:<6} {:>9}  {}  ← {}",
            entry.kind,
            format_size(entry.size_bytes),
            entry.output_path.display(),
            entry.source_path.display()
        );
    }

    log!(
        "done";
        "{}, {}, {} ({})",
        plural_count(manifest.of_kind(EntryKind::Page).count(), "page"),
        plural_count(manifest.of_kind(EntryKind::Chunk).count(), "chunk"),
        plural_count(manifest.of_kind(EntryKind::Asset).count(), "asset"),
        format_size(manifest.total_bytes())
    );
}

#[allow(clippy::cast_precision_loss)]
fn format_size(bytes: u64) -> String {
    match bytes {
        0..1024 => format!("{bytes} B"),
        1024..1_048_576 => format!("{:.1} KiB", bytes as f64 / 1024.0),
        _ => format!("{:.1} MiB", bytes as f64 / 1_048_576.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::theme::load_theme_config;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1_048_576), "3.0 MiB");
    }

    #[test]
    fn test_build_site_quiet() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("themes/default/html")).unwrap();
        fs::write(dir.path().join("themes/default/html/a.html"), "<p>a</p>").unwrap();
        let resolved =
            load_theme_config(dir.path(), Path::new("site.json"), &ConfigOverrides::default()).unwrap();

        let manifest = build_site(&resolved, false, true).unwrap();
        assert_eq!(manifest.entries().len(), 1);
        assert!(dir.path().join("dist/a.html").is_file());
    }

    #[test]
    fn test_json_build_logs_to_stderr() {
        let dir = TempDir::new().unwrap();
        // Empty page dir: the build warns but succeeds
        fs::create_dir_all(dir.path().join("themes/default/html")).unwrap();
        let resolved =
            load_theme_config(dir.path(), Path::new("site.json"), &ConfigOverrides::default()).unwrap();

        let manifest = build_site(&resolved, true, false).unwrap();
        assert!(manifest.is_empty());
        assert!(logger::is_stderr());
    }

    #[test]
    fn test_build_site_failure_is_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("themes/default")).unwrap();
        let resolved =
            load_theme_config(dir.path(), Path::new("site.json"), &ConfigOverrides::default()).unwrap();

        let err = build_site(&resolved, false, true).unwrap_err();
        assert!(err.to_string().contains("discover"));
    }
}
