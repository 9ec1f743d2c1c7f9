//! `paver serve` - build, watch, and serve with live reload.

use anyhow::Result;
use std::sync::Arc;

use super::build;
use crate::config::PipelineConfig;
use crate::core::BuildMode;
use crate::pipeline::TaskContext;
use crate::reload::{DEFAULT_WS_PORT, ReloadServer};
use crate::serve::{bind_server, tunnel};
use crate::{log, watch};

/// Run the serve sequence: build, then watcher and HTTP server until
/// Ctrl+C.
pub fn run(config: Arc<PipelineConfig>, mode: BuildMode) -> Result<()> {
    // Bind before building so early requests get a loading page
    let bound = bind_server(&config)?;
    let addr = bound.addr();

    let watch_enabled = config.serve.watch;
    let reload = watch_enabled
        .then(|| ReloadServer::start(DEFAULT_WS_PORT))
        .transpose()?;
    let ws_port = reload.as_ref().map(ReloadServer::port);

    let mut ctx = TaskContext::new(Arc::clone(&config), mode);
    if let Some(reload) = &reload {
        ctx = ctx.with_reload(reload.handle());
    }
    let ctx = Arc::new(ctx);

    // Initial build and watcher run off the request loop
    {
        let ctx = Arc::clone(&ctx);
        std::thread::spawn(move || {
            if let Err(e) = build::run(&ctx) {
                // Filesystem-level failure: serve cannot continue
                log!("error"; "initial build failed: {e:#}");
                std::process::exit(1);
            }
            crate::core::set_serving();

            if watch_enabled
                && let Err(e) = watch::run(ctx)
            {
                log!("watch"; "stopped: {e:#}");
            }
        });
    }

    let tunnel_child = tunnel::maybe_start(&config, addr);

    let result = bound.run(ws_port);

    if let Some(mut child) = tunnel_child {
        let _ = child.kill();
    }
    if let Some(reload) = &reload {
        reload.stop();
    }
    result
}
