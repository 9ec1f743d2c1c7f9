//! paver - asset pipeline for static sites.

#![allow(dead_code)]

mod alert;
mod cli;
mod config;
mod core;
mod deploy;
mod embed;
mod freshness;
mod graph;
mod logger;
mod pipeline;
mod reload;
mod render;
mod serve;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use std::sync::Arc;

use cli::{Cli, Commands};
use config::{AssetGroup, PipelineConfig, init_config};
use core::BuildMode;
use pipeline::TaskContext;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(PipelineConfig::load(&cli)?);
    let mode = BuildMode::resolve(cli.production);

    match cli.command() {
        Commands::Serve => cli::serve::run(config, mode),
        Commands::Build => cli::build::run(&TaskContext::new(config, mode)),
        Commands::Deploy => cli::deploy::run(&TaskContext::new(config, mode)),
        Commands::Clean => pipeline::clean::run(&TaskContext::new(config, mode)),
        Commands::Images => run_single(config, mode, AssetGroup::Images),
        Commands::Fonts => run_single(config, mode, AssetGroup::Fonts),
        Commands::Styles => run_single(config, mode, AssetGroup::Styles),
        Commands::Scripts => run_single(config, mode, AssetGroup::Scripts),
        Commands::Views => run_single(config, mode, AssetGroup::Views),
        Commands::RootFiles => run_single(config, mode, AssetGroup::RootFiles),
    }
}

/// Run one asset task on its own (no clean, no graph).
fn run_single(config: Arc<PipelineConfig>, mode: BuildMode, group: AssetGroup) -> Result<()> {
    let ctx = TaskContext::new(config, mode);
    pipeline::run_group(&ctx, group)
}
