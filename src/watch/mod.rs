//! Filesystem watcher: source changes re-run the owning asset task.
//!
//! One recursive watcher over the source root. Every change event is
//! classified against the path table to exactly one asset group, and each
//! event dispatches one independent task invocation on the worker pool -
//! no debouncing or coalescing, so rapid successive changes may overlap
//! invocations of the same task. The path table's disjoint destinations
//! keep overlapping runs from colliding across groups.
//!
//! Views changes dispatch an invalidate-then-render sequence so
//! layout/partial/data edits take effect.

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use crate::config::AssetGroup;
use crate::logger::{status_error, status_success};
use crate::pipeline::{TaskContext, run_group, views};
use crate::{debug, log};

/// Watch the source tree and dispatch tasks until shutdown (blocking).
pub fn run(ctx: Arc<TaskContext>) -> Result<()> {
    let source_root = ctx.config.source_root().to_path_buf();
    if !source_root.is_dir() {
        log!("watch"; "source directory missing: {}", source_root.display());
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .context("failed to create filesystem watcher")?;

    watcher
        .watch(&source_root, RecursiveMode::Recursive)
        .with_context(|| format!("failed to watch {}", source_root.display()))?;

    log!("watch"; "watching {} for changes...", ctx.config.relative_path(&source_root).display());

    loop {
        if crate::core::is_shutdown() {
            break;
        }

        let event = match rx.recv_timeout(Duration::from_millis(500)) {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                log!("watch"; "notify error: {}", e);
                continue;
            }
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if !is_relevant(&event) {
            continue;
        }

        // One event may carry several paths (renames); each group fires once
        // per event, one event per change.
        let mut groups = FxHashSet::default();
        for path in &event.paths {
            if let Some(group) = ctx.config.paths.classify(path) {
                debug!("watch"; "{} -> {}", path.display(), group);
                groups.insert(group);
            }
        }

        for group in groups {
            dispatch(&ctx, group);
        }
    }

    Ok(())
}

/// Only content-affecting events re-run tasks.
fn is_relevant(event: &notify::Event) -> bool {
    event.kind.is_create() || event.kind.is_modify() || event.kind.is_remove()
}

/// Run one task invocation for a change event.
fn dispatch(ctx: &Arc<TaskContext>, group: AssetGroup) {
    let ctx = Arc::clone(ctx);
    rayon::spawn(move || {
        let result = match group {
            // Refresh-then-render: cached layouts/partials/data are stale
            AssetGroup::Views => views::invalidate_and_render(&ctx),
            group => run_group(&ctx, group),
        };

        match result {
            Ok(()) => {
                status_success(&format!("rebuilt: {group}"));
                // Styles pushed an in-place css swap already
                if group != AssetGroup::Styles
                    && let Some(reload) = ctx.reload()
                {
                    reload.notify_reload(group.name());
                }
            }
            Err(e) => {
                status_error(&format!("{group} failed"), &format!("{e:#}"));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind};

    #[test]
    fn test_relevant_event_kinds() {
        let create = notify::Event::new(EventKind::Create(CreateKind::File));
        assert!(is_relevant(&create));

        let modify = notify::Event::new(EventKind::Modify(ModifyKind::Any));
        assert!(is_relevant(&modify));

        let access = notify::Event::new(EventKind::Access(notify::event::AccessKind::Any));
        assert!(!is_relevant(&access));
    }
}
