//! Views task: render page templates into standalone HTML documents.

use anyhow::{Context, Result};
use std::fs;

use super::TaskContext;
use crate::render::minify::minify_html;
use crate::utils::fs::ensure_parent;
use crate::log;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let dest_dir = ctx.config.paths.views.dest.clone();
    let minify = ctx.mode.is_production();

    // Render pass: a broken page is reported and skipped, the rest render.
    let rendered = ctx.with_renderer(|renderer| {
        let mut rendered = Vec::new();
        for page in renderer.page_files() {
            match renderer.render_page(&page) {
                Ok(result) => rendered.push(result),
                Err(e) => {
                    ctx.notifier.transform_error("views", &format!("{e:#}"));
                }
            }
        }
        Ok(rendered)
    });

    let pages = match rendered {
        Ok(pages) => pages,
        Err(e) => {
            // A broken layout/partial/data file fails the shared template
            // set: reported like any other transformation error.
            ctx.notifier.transform_error("views", &format!("{e:#}"));
            return Ok(());
        }
    };

    // Write pass: filesystem errors propagate and fail the task.
    let count = pages.len();
    for page in pages {
        let html = if minify {
            minify_html(&page.html)
        } else {
            page.html
        };

        let output = dest_dir.join(&page.relative);
        ensure_parent(&output)?;
        fs::write(&output, html)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    if count > 0 {
        log!("views"; "rendered {} page(s)", count);
    }
    Ok(())
}

/// Watch-mode sequence for a views change: drop cached parse state, then
/// re-render every page.
pub fn invalidate_and_render(ctx: &TaskContext) -> Result<()> {
    if let Err(e) = ctx.invalidate_renderer() {
        ctx.notifier.transform_error("views", &format!("{e:#}"));
        return Ok(());
    }
    run(ctx)
}
