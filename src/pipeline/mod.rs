//! The asset tasks and their composition into build/deploy graphs.
//!
//! Every task is a thin wrapper: enumerate sources, apply one
//! transformation, write into the group's destination directory.
//! Transformation errors are reported through the alert channel and never
//! abort the run; filesystem errors propagate and fail the node.

pub mod clean;
pub mod fonts;
pub mod images;
pub mod root_files;
pub mod scripts;
pub mod styles;
pub mod views;

use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::alert::Notifier;
use crate::config::{AssetGroup, PipelineConfig};
use crate::core::BuildMode;
use crate::graph::TaskGraph;
use crate::reload::ReloadHandle;
use crate::render::PageRenderer;

/// Process-scoped context shared by every task.
///
/// Owns the two pieces of state the tasks share: the alert channel and the
/// page renderer (whose parse cache survives across watch-mode re-renders
/// until explicitly invalidated). The live-reload handle is present only in
/// serve mode.
pub struct TaskContext {
    pub config: Arc<PipelineConfig>,
    pub mode: BuildMode,
    pub notifier: Notifier,
    reload: Option<ReloadHandle>,
    renderer: Mutex<Option<PageRenderer>>,
}

impl TaskContext {
    pub fn new(config: Arc<PipelineConfig>, mode: BuildMode) -> Self {
        Self {
            config,
            mode,
            notifier: Notifier::new(),
            reload: None,
            renderer: Mutex::new(None),
        }
    }

    /// Attach the live-reload handle (serve mode).
    pub fn with_reload(mut self, reload: ReloadHandle) -> Self {
        self.reload = Some(reload);
        self
    }

    /// Console-only alerts (tests).
    #[cfg(test)]
    pub fn silent(config: Arc<PipelineConfig>, mode: BuildMode) -> Self {
        Self {
            notifier: Notifier::silent(),
            ..Self::new(config, mode)
        }
    }

    pub fn reload(&self) -> Option<&ReloadHandle> {
        self.reload.as_ref()
    }

    /// Run `f` with the (lazily created) page renderer.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut PageRenderer) -> Result<T>) -> Result<T> {
        let mut guard = self.renderer.lock();
        if guard.is_none() {
            *guard = Some(PageRenderer::new(self.config.paths.views.clone())?);
        }
        f(guard.as_mut().expect("renderer initialized above"))
    }

    /// Drop the renderer's cached parse state (layouts/partials/data).
    pub fn invalidate_renderer(&self) -> Result<()> {
        let mut guard = self.renderer.lock();
        match guard.as_mut() {
            Some(renderer) => renderer.invalidate(),
            None => Ok(()), // nothing cached yet
        }
    }
}

/// Run the task that owns an asset group.
pub fn run_group(ctx: &TaskContext, group: AssetGroup) -> Result<()> {
    match group {
        AssetGroup::Images => images::run(ctx),
        AssetGroup::Fonts => fonts::run(ctx),
        AssetGroup::Styles => styles::run(ctx),
        AssetGroup::Scripts => scripts::run(ctx),
        AssetGroup::Views => views::run(ctx),
        AssetGroup::RootFiles => root_files::run(ctx),
    }
}

/// The `build` graph: clean, then every asset task in parallel.
pub fn build_graph() -> TaskGraph<TaskContext> {
    let mut graph = TaskGraph::new();
    graph.add_task("clean", &[], clean::run);
    graph.add_task("images", &["clean"], images::run);
    graph.add_task("fonts", &["clean"], fonts::run);
    graph.add_task("styles", &["clean"], styles::run);
    graph.add_task("scripts", &["clean"], scripts::run);
    graph.add_task("views", &["clean"], views::run);
    graph
}

/// The `deploy` graph: build, then root files, then publish.
pub fn deploy_graph() -> TaskGraph<TaskContext> {
    let mut graph = build_graph();
    graph.add_task(
        "root-files",
        &["images", "fonts", "styles", "scripts", "views"],
        root_files::run,
    );
    graph.add_task("publish", &["root-files"], |ctx: &TaskContext| {
        crate::deploy::publish(ctx)
    });
    graph
}
