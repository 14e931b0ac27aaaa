//! Hook execution utilities.
//!
//! Provides environment variable building and command execution for build hooks.

use crate::config::SiteConfig;
use crate::theme::ThemeConfig;
use crate::utils::exec::{Cmd, SILENT_FILTER};
use anyhow::{Result, bail};
use rustc_hash::FxHashMap;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Environment Variables
// ============================================================================

/// Build `$SITESMITH_*` environment variables for hook execution
pub fn build_vars(site: &SiteConfig, theme: &ThemeConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    vars.insert("SITESMITH_ROOT".into(), site.get_root().display().to_string());
    vars.insert("SITESMITH_THEME_DIR".into(), theme.path.display().to_string());
    vars.insert(
        "SITESMITH_OUTPUT_DIR".into(),
        site.build.output.display().to_string(),
    );
    vars.insert("SITESMITH_MINIFY".into(), site.build.minify.to_string());

    vars
}

// ============================================================================
// Command Argument Resolution
// ============================================================================

/// Resolve `$SITESMITH_*` variables in command arguments
///
/// Longer keys are substituted first so `$SITESMITH_ROOT_X` style names
/// never get clobbered by a shorter prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${key}");
                result = result.replace(&pattern, &vars[*key]);
            }
            result
        })
        .collect()
}

// ============================================================================
// Hook Execution
// ============================================================================

/// A fully resolved external command.
#[derive(Debug, Clone)]
pub struct HookCommand {
    /// Log prefix
    pub name: String,
    pub command: Vec<String>,
    pub timeout: Duration,
    pub quiet: bool,
}

/// Execute a single hook in `cwd`, exporting `vars` to the child.
pub fn run_hook(hook: &HookCommand, vars: &FxHashMap<String, String>, cwd: &Path) -> Result<()> {
    let resolved = resolve_args(&hook.command, vars);
    let Some(program) = resolved.first() else {
        bail!("`{}` has an empty command", hook.name);
    };

    if which::which_in(program, std::env::var_os("PATH"), cwd).is_err() {
        bail!("`{program}` not found; install it or update build.css.command");
    }

    if !hook.quiet {
        crate::log!(&hook.name; "`{}` running", program);
    }

    let output = Cmd::from_slice(&resolved)
        .cwd(cwd)
        .envs(vars)
        .timeout(hook.timeout)
        .filter(&SILENT_FILTER)
        .run()?;

    // Print output directly without prefix (unless quiet)
    if !hook.quiet {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if !stdout.is_empty() {
            println!("{stdout}");
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_args_simple() {
        let mut vars = FxHashMap::default();
        vars.insert("SITESMITH_OUTPUT_DIR".into(), "/path/to/output".into());
        vars.insert("SITESMITH_ROOT".into(), "/path/to/root".into());

        let args = vec![
            "tailwindcss".into(),
            "$SITESMITH_OUTPUT_DIR/site.css".into(),
            "--cwd".into(),
            "$SITESMITH_ROOT".into(),
        ];

        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved[0], "tailwindcss");
        assert_eq!(resolved[1], "/path/to/output/site.css");
        assert_eq!(resolved[3], "/path/to/root");
    }

    #[test]
    fn test_resolve_args_no_vars() {
        let vars = FxHashMap::default();
        let args = vec!["echo".into(), "hello".into()];
        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved, args);
    }

    #[test]
    fn test_resolve_args_longest_key_wins() {
        let mut vars = FxHashMap::default();
        vars.insert("SITESMITH_ROOT".into(), "/root".into());
        vars.insert("SITESMITH_ROOTS".into(), "/many".into());

        let resolved = resolve_args(&["$SITESMITH_ROOTS:$SITESMITH_ROOT".to_string()], &vars);
        assert_eq!(resolved[0], "/many:/root");
    }

    #[test]
    fn test_build_vars() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("themes/default")).unwrap();
        let resolved = crate::theme::load_theme_config(
            dir.path(),
            Path::new("site.json"),
            &Default::default(),
        )
        .unwrap();

        let vars = build_vars(&resolved.site, &resolved.theme);
        assert_eq!(vars["SITESMITH_MINIFY"], "true");
        assert!(vars["SITESMITH_THEME_DIR"].ends_with("default"));
        assert!(vars["SITESMITH_OUTPUT_DIR"].ends_with("dist"));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let hook = HookCommand {
            name: "css".into(),
            command: vec!["definitely-not-a-real-css-tool".into()],
            timeout: Duration::from_secs(1),
            quiet: true,
        };
        let err = run_hook(&hook, &FxHashMap::default(), Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_hook_is_error() {
        let hook = HookCommand {
            name: "css".into(),
            command: vec!["sh".into(), "-c".into(), "exit 2".into()],
            timeout: Duration::from_secs(5),
            quiet: true,
        };
        assert!(run_hook(&hook, &FxHashMap::default(), Path::new(".")).is_err());
    }
}
