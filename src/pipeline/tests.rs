use super::*;
use crate::bundle::{BundleError, BundleOutput, BundleRequest};
use crate::config::ConfigOverrides;
use crate::theme::{ResolvedSite, load_theme_config};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.json"), config).unwrap();
        fs::create_dir_all(dir.path().join("themes/default/html")).unwrap();
        Self { dir }
    }

    fn with_default_pages() -> Self {
        let project = Self::new(r#"{"theme": "default"}"#);
        project.write("html/a.html", "<html>\n  <body>\n    <p>a</p>\n  </body>\n</html>\n");
        project.write("html/sub/b.html", "<p>b</p>");
        project.write("html/c.html", "<p>c</p>");
        project
    }

    fn write(&self, theme_rel: &str, content: &str) {
        let path = self.theme_dir().join(theme_rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn theme_dir(&self) -> PathBuf {
        self.root().join("themes/default")
    }

    fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    fn resolve(&self) -> ResolvedSite {
        load_theme_config(self.root(), Path::new("site.json"), &ConfigOverrides::default()).unwrap()
    }

    fn build(&self) -> Result<BuildManifest, BuildError> {
        let resolved = self.resolve();
        BuildPipeline::new(&resolved.site, &resolved.theme)
            .quiet(true)
            .build()
    }

    fn dist_listing(&self) -> Vec<String> {
        let dist = self.dist();
        let mut files: Vec<_> = walkdir::WalkDir::new(&dist)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| crate::utils::path::to_slash(e.path().strip_prefix(&dist).unwrap()).unwrap())
            .collect();
        files.sort();
        files
    }
}

fn outputs(manifest: &BuildManifest, kind: EntryKind) -> Vec<String> {
    manifest
        .of_kind(kind)
        .map(|e| e.output_path.to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_stage_order() {
    let mut chain = vec![Stage::Clean];
    while let Some(next) = chain.last().unwrap().next() {
        chain.push(next);
    }
    assert_eq!(chain, Stage::ALL);
    assert_eq!(
        Stage::ALL.iter().filter(|s| s.is_best_effort()).collect::<Vec<_>>(),
        [&Stage::Assets]
    );
}

#[test]
fn test_end_to_end_three_pages_no_leftovers() {
    let project = Project::with_default_pages();
    fs::create_dir_all(project.dist().join("old/nested")).unwrap();
    fs::write(project.dist().join("stale.html"), "old").unwrap();
    fs::write(project.dist().join("old/nested/x.js"), "old").unwrap();

    let manifest = project.build().unwrap();

    assert_eq!(outputs(&manifest, EntryKind::Page), ["a.html", "c.html", "b.html"]);
    assert_eq!(project.dist_listing(), ["a.html", "b.html", "c.html"]);
    assert!(!project.root().join(LOCK_FILE).exists());

    let sources: Vec<_> = manifest
        .of_kind(EntryKind::Page)
        .map(|e| e.source_path.clone())
        .collect();
    assert_eq!(sources[2], PathBuf::from("themes/default/html/sub/b.html"));
}

#[test]
fn test_minified_page_and_sizes() {
    let project = Project::with_default_pages();
    let manifest = project.build().unwrap();

    let a = fs::read_to_string(project.dist().join("a.html")).unwrap();
    assert_eq!(a, "<html><body><p>a</p></body></html>");
    assert_eq!(manifest.entries()[0].size_bytes, a.len() as u64);
}

#[test]
fn test_build_is_idempotent() {
    let project = Project::with_default_pages();
    project.write("assets/app.js", "let n = 0;\nfunction tick() { n += 1; }\n");
    project.write("html/d.html", r#"<script src="/assets/app.js"></script>"#);

    let first = project.build().unwrap();
    let first_bytes: Vec<_> = project
        .dist_listing()
        .iter()
        .map(|f| fs::read(project.dist().join(f)).unwrap())
        .collect();

    let second = project.build().unwrap();
    let second_bytes: Vec<_> = project
        .dist_listing()
        .iter()
        .map(|f| fs::read(project.dist().join(f)).unwrap())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(outputs(&first, EntryKind::Chunk).len(), 1);
}

#[test]
fn test_passthrough_assets_copied() {
    let project = Project::with_default_pages();
    project.write("assets/icons/logo.svg", "<svg/>");
    project.write("assets/icons/social/x.svg", "<svg></svg>");

    let manifest = project.build().unwrap();

    assert_eq!(
        outputs(&manifest, EntryKind::Asset),
        ["icons/logo.svg", "icons/social/x.svg"]
    );
    assert_eq!(
        fs::read_to_string(project.dist().join("icons/social/x.svg")).unwrap(),
        "<svg></svg>"
    );
}

#[test]
fn test_missing_assets_does_not_fail_build() {
    let project = Project::with_default_pages();
    assert!(!project.theme_dir().join("assets").exists());

    let manifest = project.build().unwrap();
    assert_eq!(manifest.of_kind(EntryKind::Asset).count(), 0);
    assert_eq!(manifest.of_kind(EntryKind::Page).count(), 3);
}

#[test]
fn test_asset_copy_failure_keeps_build_and_copied_files() {
    let project = Project::with_default_pages();
    // The page lands at `dist/icons/sub.html` first, so the asset directory
    // of the same name cannot be created
    project.write("html/icons/sub.html", "<p>s</p>");
    project.write("assets/icons/a.svg", "<svg/>");
    project.write("assets/icons/sub.html/x.svg", "<svg/>");

    let manifest = project.build().unwrap();

    assert_eq!(outputs(&manifest, EntryKind::Asset), ["icons/a.svg"]);
    assert_eq!(manifest.of_kind(EntryKind::Page).count(), 4);
    assert_eq!(fs::read_to_string(project.dist().join("icons/a.svg")).unwrap(), "<svg/>");
    assert_eq!(fs::read_to_string(project.dist().join("icons/sub.html")).unwrap(), "<p>s</p>");
    assert!(!project.root().join(LOCK_FILE).exists());
}

#[cfg(unix)]
#[test]
fn test_stale_lock_does_not_block_build() {
    let project = Project::with_default_pages();
    fs::write(project.root().join(LOCK_FILE), "999999999\n").unwrap();

    let manifest = project.build().unwrap();
    assert_eq!(manifest.of_kind(EntryKind::Page).count(), 3);
    assert!(!project.root().join(LOCK_FILE).exists());
}

#[test]
fn test_empty_pages_is_not_failure() {
    let project = Project::new("{}");
    let manifest = project.build().unwrap();
    assert!(manifest.is_empty());
    assert!(project.dist().is_dir());
}

#[test]
fn test_missing_pages_dir_fails_discover() {
    let project = Project::new("{}");
    fs::remove_dir(project.theme_dir().join("html")).unwrap();

    let err = project.build().unwrap_err();
    assert_eq!(err.stage, Stage::Discover);
}

#[cfg(unix)]
#[test]
fn test_styles_failure_leaves_clean_output() {
    let project = Project::new(r#"{"build": {"css": {"command": ["sh", "-c", "touch \"$SITESMITH_OUTPUT_DIR/partial.css\"; exit 1"]}}}"#);
    project.write("html/a.html", "<p>a</p>");
    fs::create_dir_all(project.dist()).unwrap();
    fs::write(project.dist().join("stale.html"), "old").unwrap();

    let err = project.build().unwrap_err();
    assert_eq!(err.stage, Stage::Styles);
    assert_eq!(err.failures.len(), 1);
    assert!(project.dist().is_dir());
    assert!(project.dist_listing().is_empty());
}

#[cfg(unix)]
#[test]
fn test_styles_runs_before_discovery() {
    let project = Project::new(
        r#"{"build": {"css": {"command": ["sh", "-c", "echo '<p>gen</p>' > \"$SITESMITH_THEME_DIR/html/gen.html\""]}}}"#,
    );
    let manifest = project.build().unwrap();
    assert_eq!(outputs(&manifest, EntryKind::Page), ["gen.html"]);
}

#[test]
fn test_refuses_to_clean_project_root() {
    let project = Project::new(r#"{"build": {"output": "."}}"#);
    project.write("html/a.html", "<p>a</p>");

    let err = project.build().unwrap_err();
    assert_eq!(err.stage, Stage::Clean);
    assert!(project.root().join("site.json").exists());
    assert!(project.theme_dir().join("html/a.html").exists());
}

#[test]
fn test_concurrent_build_is_rejected() {
    let project = Project::with_default_pages();
    let _held = BuildLock::acquire(project.root()).unwrap();

    let err = project.build().unwrap_err();
    assert_eq!(err.stage, Stage::Clean);
    assert!(err.failures[0].message.contains("another build"));
}

/// Records the request and fails every entry.
#[derive(Default)]
struct RejectingBundler {
    seen: Mutex<Vec<String>>,
}

impl Bundler for &RejectingBundler {
    fn bundle(&self, request: &BundleRequest<'_>) -> Result<BundleOutput, BundleError> {
        let names: Vec<_> = request.entries.iter().map(|e| e.relative_path.clone()).collect();
        self.seen.lock().unwrap().extend(names.iter().cloned());
        fs::write(request.output_dir.join("half.html"), "partial").unwrap();
        Err(BundleError {
            failures: names
                .into_iter()
                .map(|n| EntryFailure::new(n, "rejected"))
                .collect(),
        })
    }
}

#[test]
fn test_bundler_failures_all_reported() {
    let project = Project::with_default_pages();
    let resolved = project.resolve();
    let bundler = RejectingBundler::default();

    let err = BuildPipeline::new(&resolved.site, &resolved.theme)
        .with_bundler(&bundler)
        .quiet(true)
        .build()
        .unwrap_err();

    assert_eq!(err.stage, Stage::Bundle);
    let entries: Vec<_> = err.failures.iter().map(|f| f.entry.as_str()).collect();
    assert_eq!(entries, ["a.html", "c.html", "sub/b.html"]);
    assert_eq!(*bundler.seen.lock().unwrap(), ["a.html", "c.html", "sub/b.html"]);
    assert!(project.dist_listing().is_empty());
}
