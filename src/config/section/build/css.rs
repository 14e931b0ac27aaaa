//! CSS toolchain configuration.
//!
//! # Example
//!
//! ```json
//! "css": {
//!   "command": ["tailwindcss"],
//!   "input": "assets/css/main.css",
//!   "output": "assets/css/site.css",
//!   "timeout_secs": 120
//! }
//! ```
//!
//! `input` and `output` are relative to the theme directory. When both are
//! set, the command expands to `command -i <input> -o <output>`, with
//! `--minify` appended when `build.minify` is on. When they are absent the
//! command runs as written, after `$SITESMITH_*` substitution.

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// External CSS preprocessing step run before bundling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssProcessorConfig {
    /// Command and arguments (e.g., `["tailwindcss"]` or `["npx", "tailwindcss"]`).
    /// Empty means the styles stage is skipped.
    pub command: Vec<String>,
    /// Input stylesheet, relative to the theme directory.
    pub input: Option<PathBuf>,
    /// Generated stylesheet, relative to the theme directory.
    pub output: Option<PathBuf>,
    /// Kill the toolchain after this many seconds.
    pub timeout_secs: u64,
    /// Suppress toolchain stdout (default: true).
    pub quiet: bool,
}

impl Default for CssProcessorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            input: None,
            output: None,
            timeout_secs: 120,
            quiet: true,
        }
    }
}

impl CssProcessorConfig {
    /// Whether a toolchain command is configured at all.
    pub fn is_enabled(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Display name for logging (`command[0]`).
    pub fn display_name(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("css")
    }

    /// Validate CSS processor configuration.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.timeout_secs == 0 {
            diag.error_with_hint(
                "build.css.timeout_secs",
                "timeout must be greater than zero",
                "use a generous value such as 120",
            );
        }

        if self.input.is_some() != self.output.is_some() {
            diag.error(
                "build.css",
                "`input` and `output` must be set together",
            );
        }

        if !self.is_enabled() && self.input.is_some() {
            diag.error_with_hint(
                "build.css.command",
                "`input` is set but no command is configured",
                "set `command`, e.g. [\"tailwindcss\"]",
            );
        }

        for path in [&self.input, &self.output].into_iter().flatten() {
            if path.is_absolute() {
                diag.error(
                    "build.css",
                    format!("`{}` must be relative to the theme directory", path.display()),
                );
            }
        }
    }
}
