//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// paver - asset pipeline for static sites
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: paver.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "paver.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Production mode: minify styles, scripts and markup
    /// (equivalent to PAVER_ENV=production)
    #[arg(short, long, global = true)]
    pub production: bool,

    /// Enable verbose output for debugging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Task to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available tasks
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Delete the destination directory tree
    Clean,

    /// Clean, then run every asset task in parallel
    #[command(visible_alias = "b")]
    Build,

    /// Build, then watch for changes and serve with live reload
    #[command(visible_alias = "s")]
    Serve,

    /// Build, copy root files, and publish to the configured target
    #[command(visible_alias = "d")]
    Deploy,

    /// Optimize images into the destination tree
    Images,

    /// Copy fonts into the destination tree
    Fonts,

    /// Compile stylesheets into the destination tree
    Styles,

    /// Bundle scripts into the destination tree
    Scripts,

    /// Render page templates into the destination tree
    Views,

    /// Copy top-level root files (CNAME, robots.txt, ...) into the
    /// destination tree
    RootFiles,
}

impl Cli {
    /// The selected command; serve is the default task.
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
