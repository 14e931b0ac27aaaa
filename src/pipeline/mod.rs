//! Site build pipeline.
//!
//! A finite state machine over five stages:
//!
//! ```text
//! Clean → Styles → Discover → Bundle → Assets → done
//! ```
//!
//! Each stage runs only if the previous one succeeded. `Assets` is the one
//! best-effort stage: its failures are logged and the build still succeeds.
//! When a gated stage after `Clean` fails, the destination is cleaned again
//! so a failed build never leaves output behind.

mod lock;
mod manifest;
mod stages;

#[cfg(test)]
mod tests;

pub use lock::{BuildLock, LOCK_FILE, release_active_lock};
pub use manifest::{BuildManifest, EntryKind, ManifestEntry};

use crate::bundle::{Bundler, EntryFailure, NativeBundler};
use crate::config::SiteConfig;
use crate::discovery::DiscoveredEntry;
use crate::theme::ThemeConfig;
use crate::{debug, log};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Styles,
    Discover,
    Bundle,
    Assets,
}

impl Stage {
    #[cfg(test)]
    pub const ALL: [Stage; 5] = [
        Stage::Clean,
        Stage::Styles,
        Stage::Discover,
        Stage::Bundle,
        Stage::Assets,
    ];

    pub fn next(self) -> Option<Stage> {
        match self {
            Self::Clean => Some(Self::Styles),
            Self::Styles => Some(Self::Discover),
            Self::Discover => Some(Self::Bundle),
            Self::Bundle => Some(Self::Assets),
            Self::Assets => None,
        }
    }

    /// Failures of a best-effort stage never fail the build.
    pub fn is_best_effort(self) -> bool {
        self == Self::Assets
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Styles => "styles",
            Self::Discover => "discover",
            Self::Bundle => "bundle",
            Self::Assets => "assets",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A build stopped at `stage`, with every failure that stage collected.
#[derive(Debug, thiserror::Error)]
#[error("build failed at the {stage} stage ({} failure(s))", failures.len())]
pub struct BuildError {
    pub stage: Stage,
    pub failures: Vec<EntryFailure>,
}

type StageResult = Result<(), Vec<EntryFailure>>;

/// Data handed from one stage to the next.
#[derive(Default)]
struct BuildState {
    entries: Vec<DiscoveredEntry>,
    produced: Vec<ManifestEntry>,
}

pub struct BuildPipeline<'a> {
    site: &'a SiteConfig,
    theme: &'a ThemeConfig,
    bundler: Box<dyn Bundler + 'a>,
    quiet: bool,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(site: &'a SiteConfig, theme: &'a ThemeConfig) -> Self {
        Self {
            site,
            theme,
            bundler: Box::new(NativeBundler),
            quiet: false,
        }
    }

    #[cfg(test)]
    pub fn with_bundler(mut self, bundler: impl Bundler + 'a) -> Self {
        self.bundler = Box::new(bundler);
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn output_dir(&self) -> &Path {
        &self.site.build.output
    }

    /// Run every stage under the build lock.
    pub fn build(&self) -> Result<BuildManifest, BuildError> {
        let _lock = BuildLock::acquire(self.site.get_root()).map_err(|e| BuildError {
            stage: Stage::Clean,
            failures: vec![EntryFailure::new(
                LOCK_FILE,
                format!("another build appears to be running ({e}); remove the lock file if not"),
            )],
        })?;

        let mut state = BuildState::default();
        let mut stage = Some(Stage::Clean);

        while let Some(current) = stage {
            debug!("build"; "stage {current}");
            match self.run_stage(current, &mut state) {
                Ok(()) => {}
                Err(failures) if current.is_best_effort() => {
                    log!("warning"; "{} {} failed to copy; build continues", failures.len(), current);
                    for failure in &failures {
                        debug!("build"; "{failure}");
                    }
                }
                Err(failures) => {
                    self.discard_output(current);
                    return Err(BuildError {
                        stage: current,
                        failures,
                    });
                }
            }
            stage = current.next();
        }

        Ok(BuildManifest::new(state.produced))
    }

    fn run_stage(&self, stage: Stage, state: &mut BuildState) -> StageResult {
        match stage {
            Stage::Clean => stages::clean(self),
            Stage::Styles => stages::styles(self),
            Stage::Discover => {
                state.entries = stages::discover(self)?;
                Ok(())
            }
            Stage::Bundle => {
                let produced = stages::bundle(self, &state.entries)?;
                state.produced.extend(produced);
                Ok(())
            }
            Stage::Assets => stages::assets(self, &mut state.produced),
        }
    }

    /// Leave an empty destination after a failed build.
    fn discard_output(&self, failed: Stage) {
        if failed == Stage::Clean {
            return;
        }
        if let Err(e) = stages::clear_dir(self.output_dir()) {
            log!("warning"; "could not clean output after failed {failed}: {e}");
        }
    }
}
