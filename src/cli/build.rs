//! `paver build` - run the build graph.

use anyhow::{Context, Result};
use std::time::Instant;

use crate::graph::{self, RunReport, TaskGraph};
use crate::pipeline::{TaskContext, build_graph};
use crate::log;

/// Run a task graph and log the outcome.
pub fn run_graph(ctx: &TaskContext, tasks: TaskGraph<TaskContext>) -> Result<RunReport> {
    let start = Instant::now();
    let report = graph::run(&tasks, ctx).context("invalid task graph")?;

    for (name, message) in &report.failed {
        log!("error"; "task '{}' failed: {}", name, message);
    }
    for name in &report.skipped {
        log!("build"; "skipped '{}' (dependency failed)", name);
    }

    if report.is_success() {
        log!(
            "build";
            "{} task(s) completed in {:.2?}",
            report.succeeded.len(),
            start.elapsed()
        );
    }

    Ok(report)
}

/// The `build` entry point: clean, then every asset task in parallel.
///
/// Transformation errors were already swallowed per task; a failure here
/// is filesystem-level and aborts with a non-zero exit.
pub fn run(ctx: &TaskContext) -> Result<()> {
    run_graph(ctx, build_graph())?.into_result().map(|_| ())
}
