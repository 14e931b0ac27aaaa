//! Command-line interface definitions.

use crate::config::{ConfigOverrides, DEFAULT_CONFIG_FILE};
use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Themeable content-site builder and dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root directory (default: current directory)
    #[arg(long, global = true, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Config file path, relative to the project root
    #[arg(short = 'C', long, global = true, default_value = DEFAULT_CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Theme name under `themes/`
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Minify bundled output
    #[arg(short, long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the output directory
    #[command(visible_alias = "b")]
    Build {
        /// Print the build manifest as JSON
        #[arg(long)]
        json: bool,

        /// Suppress progress and summary output
        #[arg(short, long)]
        quiet: bool,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Start the development server
    #[command(visible_alias = "s")]
    Serve {
        /// Serve the build output instead of theme sources
        #[arg(long)]
        built: bool,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable verbose output for debugging
        #[arg(short = 'V', long)]
        verbose: bool,
    },

    /// Print the current route table as JSON
    #[command(visible_alias = "r")]
    Routes {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

impl Cli {
    /// Config values given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        let (interface, port) = match &self.command {
            Commands::Serve { interface, port, .. } => (*interface, *port),
            _ => (None, None),
        };
        ConfigOverrides {
            theme: self.theme.clone(),
            output: self.output.clone(),
            minify: self.minify,
            interface,
            port,
        }
    }

    pub const fn is_verbose(&self) -> bool {
        matches!(
            self.command,
            Commands::Build { verbose: true, .. } | Commands::Serve { verbose: true, .. }
        )
    }

    /// Stdout carries JSON, so log lines must go elsewhere.
    pub const fn prints_json(&self) -> bool {
        matches!(self.command, Commands::Build { json: true, .. } | Commands::Routes { .. })
    }
}
