//! `build` section configuration.
//!
//! # Example
//!
//! ```json
//! "build": {
//!   "output": "dist",        // Output directory (relative to project root)
//!   "minify": true,          // Minify pages, scripts and stylesheets
//!   "passthrough": "icons",  // Theme assets subdirectory copied verbatim
//!   "css": { ... }           // External CSS toolchain, see [`css`]
//! }
//! ```

mod css;

pub use css::CssProcessorConfig;

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Build output directory.
    pub output: PathBuf,

    /// Minify bundled output.
    pub minify: bool,

    /// Subdirectory of the theme's assets copied into the output as-is.
    pub passthrough: PathBuf,

    /// External CSS toolchain.
    pub css: CssProcessorConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "dist".into(),
            minify: true,
            passthrough: "icons".into(),
            css: CssProcessorConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    /// Validate build configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.output.as_os_str().is_empty() {
            diag.error("build.output", "output directory must not be empty");
        }

        if !is_plain_relative(&self.passthrough) {
            diag.error_with_hint(
                "build.passthrough",
                format!("`{}` must be a relative path without `..`", self.passthrough.display()),
                "name a directory inside the theme's assets, e.g. \"icons\"",
            );
        }

        self.css.validate(diag);
    }
}

fn is_plain_relative(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
