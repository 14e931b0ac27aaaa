//! Active theme resolution.
//!
//! A theme is a directory under `<root>/themes/<name>/` laid out as:
//!
//! ```text
//! themes/<name>/
//! ├── components/
//! ├── routes/          # api handlers, 404.html, error.html
//! ├── assets/          # css, js, passthrough dirs (icons)
//! └── html/            # page entries, layout.html
//! ```
//!
//! [`ThemeResolver`] owns the loaded snapshot. Readers take an `Arc` via
//! [`ThemeResolver::current`]; [`ThemeResolver::load`] re-reads `site.json`
//! and swaps in a complete new snapshot.

use crate::config::{ConfigOverrides, SiteConfig};
use crate::debug;
use arc_swap::ArcSwap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Directory under the project root that holds all themes.
pub const THEMES_DIR: &str = "themes";

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("theme `{name}` not found: `{}` is not a directory", path.display())]
    NotFound { name: String, path: PathBuf },
}

/// Resolved locations of one theme. Every path is a join off [`Self::path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub name: String,
    pub path: PathBuf,
    pub components_path: PathBuf,
    pub routes_path: PathBuf,
    pub assets_path: PathBuf,
    pub layout_entry_path: PathBuf,
    pub pages_path: PathBuf,
}

impl ThemeConfig {
    /// Resolve `themes/<name>/` under `root`, requiring it to be a directory.
    pub fn resolve(root: &Path, name: &str) -> Result<Self, ThemeError> {
        let path = root.join(THEMES_DIR).join(name);

        if !is_plain_name(name) || !path.is_dir() {
            return Err(ThemeError::NotFound {
                name: name.to_string(),
                path,
            });
        }

        Ok(Self::at(name, path))
    }

    fn at(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            components_path: path.join("components"),
            routes_path: path.join("routes"),
            assets_path: path.join("assets"),
            layout_entry_path: path.join("html").join("layout.html"),
            pages_path: path.join("html"),
            path,
        }
    }
}

/// Single path component, so the name cannot leave `themes/`.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\', '\0'])
}

/// One consistent view of site config plus the theme it selects.
#[derive(Debug, Clone)]
pub struct ResolvedSite {
    pub site: SiteConfig,
    pub theme: ThemeConfig,
}

/// Read `site.json` and resolve its theme.
///
/// Config problems are non-fatal (logged, defaults used); a missing theme
/// directory is the only error.
pub fn load_theme_config(
    root: &Path,
    config_file: &Path,
    overrides: &ConfigOverrides,
) -> Result<ResolvedSite, ThemeError> {
    let site = SiteConfig::load(root, config_file, overrides);
    let theme = ThemeConfig::resolve(site.get_root(), &site.theme)?;
    debug!("theme"; "using `{}` at {}", theme.name, theme.path.display());
    Ok(ResolvedSite { site, theme })
}

/// Owner of the live [`ResolvedSite`] snapshot.
pub struct ThemeResolver {
    root: PathBuf,
    config_file: PathBuf,
    overrides: ConfigOverrides,
    snapshot: ArcSwap<ResolvedSite>,
}

impl ThemeResolver {
    /// Load once; fails when the configured theme does not exist.
    pub fn new(
        root: impl Into<PathBuf>,
        config_file: impl Into<PathBuf>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ThemeError> {
        let root = root.into();
        let config_file = config_file.into();
        let resolved = load_theme_config(&root, &config_file, &overrides)?;
        Ok(Self {
            root,
            config_file,
            overrides,
            snapshot: ArcSwap::from_pointee(resolved),
        })
    }

    /// Re-read the config and replace the snapshot.
    ///
    /// On error the previous snapshot stays in place.
    pub fn load(&self) -> Result<Arc<ResolvedSite>, ThemeError> {
        let resolved = Arc::new(load_theme_config(
            &self.root,
            &self.config_file,
            &self.overrides,
        )?);
        self.snapshot.store(Arc::clone(&resolved));
        Ok(resolved)
    }

    pub fn current(&self) -> Arc<ResolvedSite> {
        self.snapshot.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(themes: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in themes {
            fs::create_dir_all(dir.path().join(THEMES_DIR).join(name)).unwrap();
        }
        dir
    }

    fn resolver(dir: &TempDir) -> Result<ThemeResolver, ThemeError> {
        ThemeResolver::new(dir.path(), "site.json", ConfigOverrides::default())
    }

    #[test]
    fn test_default_theme_without_config() {
        let dir = project(&["default"]);
        let resolved = resolver(&dir).unwrap().current();
        assert_eq!(resolved.theme.name, "default");
        assert!(resolved.theme.path.ends_with("themes/default"));
    }

    #[test]
    fn test_derived_paths_under_theme_root() {
        let dir = project(&["default"]);
        let theme = resolver(&dir).unwrap().current().theme.clone();
        for derived in [
            &theme.components_path,
            &theme.routes_path,
            &theme.assets_path,
            &theme.layout_entry_path,
            &theme.pages_path,
        ] {
            assert!(derived.starts_with(&theme.path), "{}", derived.display());
        }
        assert!(theme.layout_entry_path.ends_with("html/layout.html"));
    }

    #[test]
    fn test_missing_theme_is_not_found() {
        let dir = project(&[]);
        fs::write(dir.path().join("site.json"), r#"{"theme": "ghost"}"#).unwrap();

        let err = resolver(&dir).err().unwrap();
        assert!(matches!(err, ThemeError::NotFound { ref name, .. } if name == "ghost"));
        assert!(!dir.path().join(THEMES_DIR).exists());
    }

    #[test]
    fn test_theme_file_is_not_a_directory() {
        let dir = project(&[]);
        fs::create_dir(dir.path().join(THEMES_DIR)).unwrap();
        fs::write(dir.path().join(THEMES_DIR).join("default"), "").unwrap();
        assert!(resolver(&dir).is_err());
    }

    #[test]
    fn test_theme_name_cannot_escape() {
        let dir = project(&["default"]);
        fs::create_dir(dir.path().join("outside")).unwrap();
        for name in ["../outside", "default/..", "..", "a\\b", ""] {
            assert!(ThemeConfig::resolve(dir.path(), name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_malformed_config_uses_default_theme() {
        let dir = project(&["default"]);
        fs::write(dir.path().join("site.json"), "{ not json").unwrap();
        assert_eq!(resolver(&dir).unwrap().current().theme.name, "default");
    }

    #[test]
    fn test_reload_picks_up_theme_change() {
        let dir = project(&["default", "dark"]);
        let resolver = resolver(&dir).unwrap();
        let before = resolver.current();

        fs::write(dir.path().join("site.json"), r#"{"theme": "dark"}"#).unwrap();
        resolver.load().unwrap();

        assert_eq!(before.theme.name, "default");
        assert_eq!(resolver.current().theme.name, "dark");
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let dir = project(&["default"]);
        let resolver = resolver(&dir).unwrap();

        fs::write(dir.path().join("site.json"), r#"{"theme": "ghost"}"#).unwrap();
        assert!(resolver.load().is_err());
        assert_eq!(resolver.current().theme.name, "default");
    }

    #[test]
    fn test_override_selects_theme() {
        let dir = project(&["default", "dark"]);
        let overrides = ConfigOverrides {
            theme: Some("dark".into()),
            ..Default::default()
        };
        let resolver = ThemeResolver::new(dir.path(), "site.json", overrides).unwrap();
        assert_eq!(resolver.current().theme.name, "dark");
    }
}
