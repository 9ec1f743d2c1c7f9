//! Clean task: delete the destination tree.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;

use super::TaskContext;
use crate::log;

/// Delete the destination directory tree.
///
/// Idempotent: an already-missing tree is success. Everything else
/// (permission denied, I/O errors) propagates unmodified.
pub fn run(ctx: &TaskContext) -> Result<()> {
    let output = ctx.config.output_root();

    match fs::remove_dir_all(output) {
        Ok(()) => {
            log!("clean"; "removed {}", ctx.config.relative_path(output).display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => {
            Err(e).with_context(|| format!("failed to remove {}", output.display()))
        }
    }
}
