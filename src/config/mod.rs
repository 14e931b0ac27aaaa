//! Site configuration management for `site.json`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build/     # "build" and the css toolchain
//! │   └── serve      # "serve"
//! ├── types/         # ConfigError, diagnostics
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! The file is optional. A missing file means defaults; a malformed one is
//! reported and also means defaults, never an aborted startup.
//!
//! ```json
//! { "theme": "default", "build": { "output": "dist" }, "serve": { "port": 5277 } }
//! ```

pub mod section;
pub mod types;

pub use section::{BuildSectionConfig, ServeConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    net::IpAddr,
    path::{Path, PathBuf},
};

/// Config file name looked up at the project root.
pub const DEFAULT_CONFIG_FILE: &str = "site.json";

/// Theme used when the config names none.
pub const DEFAULT_THEME: &str = "default";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing site.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Active theme name, resolved under `themes/<name>/`
    pub theme: String,

    /// Build settings
    pub build: BuildSectionConfig,

    /// Development server settings
    pub serve: ServeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            theme: DEFAULT_THEME.into(),
            build: BuildSectionConfig::default(),
            serve: ServeConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub output: Option<PathBuf>,
    pub minify: Option<bool>,
    pub interface: Option<IpAddr>,
    pub port: Option<u16>,
}

impl SiteConfig {
    /// Load configuration for a project root.
    ///
    /// Never fails: a missing file yields defaults, and a malformed or
    /// invalid file is logged as a warning and also yields defaults.
    /// Overrides are applied on top either way.
    pub fn load(root: &Path, config_file: &Path, overrides: &ConfigOverrides) -> Self {
        let root = crate::utils::path::normalize_path(root);
        let config_path = if config_file.is_absolute() {
            config_file.to_path_buf()
        } else {
            root.join(config_file)
        };

        let mut config = match Self::read(&config_path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                crate::debug!("config"; "no {} found, using defaults", config_path.display());
                Self::default()
            }
            Err(e) => {
                log!("warning"; "{e:#}; falling back to defaults");
                Self::default()
            }
        };

        config.config_path = config_path;
        config.apply_overrides(overrides);
        config.finalize(&root);
        config
    }

    /// Read and validate a config file.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };

        let (config, ignored) = Self::parse_with_ignored(&content)
            .map_err(|e| ConfigError::Json(path.to_path_buf(), e))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        Ok(Some(config))
    }

    /// Parse JSON content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), serde_json::Error> {
        let mut ignored = Vec::new();
        let mut deserializer = serde_json::Deserializer::from_str(content);
        let config: Self = serde_ignored::deserialize(&mut deserializer, |path| {
            ignored.push(path.to_string());
        })?;
        deserializer.end()?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Validate configuration, collecting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        if self.theme.trim().is_empty() {
            diag.error_with_hint("theme", "theme name must not be empty", "omit the field to use \"default\"");
        }

        self.build.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        Self::update_option(&mut self.theme, overrides.theme.as_ref());
        Self::update_option(&mut self.build.output, overrides.output.as_ref());
        Self::update_option(&mut self.build.minify, overrides.minify.as_ref());
        Self::update_option(&mut self.serve.interface, overrides.interface.as_ref());
        Self::update_option(&mut self.serve.port, overrides.port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize paths relative to the project root.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        self.build.output = crate::utils::path::normalize_path(&root.join(&self.build.output));
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config JSON.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(json: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(json).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
