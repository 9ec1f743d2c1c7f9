//! Process state for serve mode.
//!
//! Two orthogonal states:
//! - `SERVING`: initial build finished, requests get real content
//! - `SHUTDOWN`: Ctrl+C received, everything should wind down

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tiny_http::Server;

/// Initial build has completed; the destination tree is servable.
static SERVING: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for unblocking the accept loop on shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for the watch/reload threads
static SHUTDOWN_TX: OnceLock<crossbeam::channel::Sender<()>> = OnceLock::new();

/// Check if the initial build has completed
pub fn is_serving() -> bool {
    SERVING.load(Ordering::SeqCst)
}

/// Mark the destination tree as servable (call after the initial build)
pub fn set_serving() {
    SERVING.store(true, Ordering::SeqCst);
}

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// Before `register_server()` the process exits immediately; after it, the
/// HTTP accept loop is unblocked and threads drain via the shutdown channel.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if let Some(tx) = SHUTDOWN_TX.get() {
            let _ = tx.send(());
        }

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "shutting down...");
            server.unblock();
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful unblock on shutdown.
///
/// Call after binding the server, before entering the request loop.
pub fn register_server(server: Arc<Server>, shutdown_tx: crossbeam::channel::Sender<()>) {
    let _ = SERVER.set(server);
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
///
/// Relaxed ordering: worst case a few more items are processed before
/// stopping, which is acceptable.
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
