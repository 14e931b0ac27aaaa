//! sitesmith - a themeable content-site builder and dev server.

mod bundle;
mod cli;
mod config;
mod discovery;
mod fallback;
mod hooks;
mod logger;
mod pipeline;
mod router;
mod theme;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, serve::ServeMode};
use theme::ThemeResolver;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    cli::serve::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.is_verbose());
    logger::set_stderr(cli.prints_json());

    let resolver = ThemeResolver::new(&cli.root, &cli.config, cli.overrides())
        .context("cannot start without a theme")?;

    match &cli.command {
        Commands::Build { json, quiet, .. } => {
            cli::build::build_site(&resolver.current(), *json, *quiet).map(|_| ())
        }
        Commands::Serve { built, .. } => {
            let mode = if *built { ServeMode::Built } else { ServeMode::Source };
            cli::serve::serve_site(resolver, mode)
        }
        Commands::Routes { pretty } => cli::routes::print_routes(&resolver.current(), *pretty),
    }
}
