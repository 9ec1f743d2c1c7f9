//! `paver deploy` - build, copy root files, publish.

use anyhow::Result;

use super::build::run_graph;
use crate::pipeline::{TaskContext, deploy_graph};

/// Run the deploy sequence to completion.
///
/// Publish errors (network, authentication) propagate and abort with a
/// non-zero exit; there is no partial-success reporting beyond what the
/// push itself printed.
pub fn run(ctx: &TaskContext) -> Result<()> {
    run_graph(ctx, deploy_graph())?.into_result().map(|_| ())
}
