//! CSS toolchain integration.
//!
//! The toolchain runs once per build, before discovery, so that generated
//! stylesheets exist when pages are bundled.

mod tailwind;

use super::{HookCommand, build_vars, run_hook};
use crate::config::SiteConfig;
use crate::theme::ThemeConfig;
use anyhow::{Context, Result};

/// Build the hook for the configured toolchain, or `None` when no command is set.
pub fn build_css_hook(site: &SiteConfig, theme: &ThemeConfig) -> Option<HookCommand> {
    let css = &site.build.css;
    if !css.is_enabled() {
        return None;
    }

    let command = match (&css.input, &css.output) {
        (Some(input), Some(output)) => tailwind::expand(
            &css.command,
            &theme.path.join(input),
            &theme.path.join(output),
            site.build.minify,
        ),
        _ => css.command.clone(),
    };

    Some(HookCommand {
        name: "css".into(),
        command,
        timeout: css.timeout(),
        quiet: css.quiet,
    })
}

/// Run the CSS toolchain in the project root.
///
/// Returns `false` when the stage has nothing to do.
pub fn run_css(site: &SiteConfig, theme: &ThemeConfig) -> Result<bool> {
    let Some(hook) = build_css_hook(site, theme) else {
        return Ok(false);
    };

    if let Some(output) = &site.build.css.output {
        let output = theme.path.join(output);
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create `{}`", parent.display()))?;
        }
    }

    let vars = build_vars(site, theme);
    run_hook(&hook, &vars, site.get_root())
        .with_context(|| format!("CSS toolchain `{}` failed", site.build.css.display_name()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::theme::{ResolvedSite, load_theme_config};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn site(json: &str) -> (TempDir, ResolvedSite) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("themes/default")).unwrap();
        fs::write(dir.path().join("site.json"), json).unwrap();
        let resolved =
            load_theme_config(dir.path(), Path::new("site.json"), &ConfigOverrides::default())
                .unwrap();
        (dir, resolved)
    }

    #[test]
    fn test_no_command_skips() {
        let (_dir, resolved) = site("{}");
        assert!(build_css_hook(&resolved.site, &resolved.theme).is_none());
        assert!(!run_css(&resolved.site, &resolved.theme).unwrap());
    }

    #[test]
    fn test_input_output_expand_against_theme() {
        let (_dir, resolved) = site(
            r#"{"build": {"css": {"command": ["tailwindcss"], "input": "assets/in.css", "output": "assets/out.css"}}}"#,
        );
        let hook = build_css_hook(&resolved.site, &resolved.theme).unwrap();
        assert_eq!(hook.command[1], "-i");
        assert!(hook.command[2].ends_with("themes/default/assets/in.css"));
        assert_eq!(hook.command.last().map(String::as_str), Some("--minify"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_runs_with_vars() {
        let (dir, resolved) = site(
            r#"{"build": {"css": {"command": ["sh", "-c", "echo ok > \"$SITESMITH_THEME_DIR/marker\""]}}}"#,
        );
        assert!(run_css(&resolved.site, &resolved.theme).unwrap());
        let marker = dir.path().join("themes/default/marker");
        assert_eq!(fs::read_to_string(marker).unwrap().trim(), "ok");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_fails_stage() {
        let (_dir, resolved) = site(
            r#"{"build": {"css": {"command": ["sleep", "5"], "timeout_secs": 1}}}"#,
        );
        let err = run_css(&resolved.site, &resolved.theme).unwrap_err();
        assert!(format!("{err:#}").contains("timed out"));
    }
}
