//! Development server: static files over the destination tree with
//! live-reload injection.

mod response;
pub mod tunnel;

use anyhow::{Context, Result};
use crossbeam::channel;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_http::{Request, Server};

use crate::config::PipelineConfig;
use crate::log;

/// Attempts when the configured HTTP port is busy.
const MAX_PORT_RETRIES: u16 = 10;

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server without starting the request loop.
///
/// Binding early lets the caller kick off the initial build in the
/// background while requests get a loading page.
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = bind_with_retry(config)?;
    let server = Arc::new(server);

    let (shutdown_tx, _shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);
    Ok(BoundServer { server, addr })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the request loop until shutdown (blocking).
    ///
    /// `ws_port` is `Some` when live reload is active; served HTML then
    /// gets the client script injected.
    pub fn run(self, ws_port: Option<u16>) -> Result<()> {
        // Thread pool so one slow transfer doesn't block the rest
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .context("failed to create server thread pool")?;

        for request in self.server.incoming_requests() {
            if crate::core::is_shutdown() {
                break;
            }
            let config = crate::config::cfg();
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &config, ws_port) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request.
fn handle_request(
    request: Request,
    config: &PipelineConfig,
    ws_port: Option<u16>,
) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    // The live-reload client is served from memory
    if let Some(port) = ws_port
        && request.url() == crate::embed::LIVERELOAD_JS_PATH
    {
        return response::respond_livereload_js(request, port);
    }

    if !crate::core::is_serving() {
        return response::respond_loading(request);
    }

    match resolve_path(request.url(), config.output_root()) {
        Some(path) => response::respond_file(request, &path, ws_port),
        None => response::respond_not_found(request, config, ws_port),
    }
}

/// Map a request URL onto a file in the destination tree.
///
/// Directory URLs resolve to their `index.html`; `..` segments are
/// rejected so requests cannot escape the tree.
fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);

    let mut file = root.to_path_buf();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            _ => file.push(segment),
        }
    }

    if file.is_dir() {
        file.push("index.html");
    }
    file.is_file().then_some(file)
}

fn bind_with_retry(config: &PipelineConfig) -> Result<(Server, SocketAddr)> {
    let interface = config.serve.interface;
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = config.serve.port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        // Probe with std first for a usable error message
        match TcpListener::bind(addr) {
            Ok(listener) => {
                drop(listener);
                let server = Server::http(addr)
                    .map_err(|e| anyhow::anyhow!("failed to start server on {addr}: {e}"))?;
                return Ok((server, addr));
            }
            Err(e) => {
                last_error = Some(e);
            }
        }
    }

    Err(anyhow::anyhow!(
        "no free port after {} attempts starting at {}: {}",
        MAX_PORT_RETRIES,
        config.serve.port,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
