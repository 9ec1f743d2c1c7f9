//! WebSocket acceptor for live reload.

use anyhow::Result;
use parking_lot::Mutex;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tungstenite::protocol::Message;

use super::{ClientList, ReloadHandle, ReloadMessage};

/// Default WebSocket port for live reload.
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Maximum port retry attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Live-reload server context object.
pub struct ReloadServer {
    clients: ClientList,
    port: u16,
    stopped: Arc<AtomicBool>,
}

impl ReloadServer {
    /// Bind the listener (retrying on busy ports) and start accepting
    /// clients on a background thread.
    pub fn start(base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
        listener.set_nonblocking(true)?;

        let clients: ClientList = Arc::new(Mutex::new(Vec::new()));
        let stopped = Arc::new(AtomicBool::new(false));

        {
            let clients = Arc::clone(&clients);
            let stopped = Arc::clone(&stopped);
            std::thread::spawn(move || accept_loop(&listener, &clients, &stopped));
        }

        crate::debug!("reload"; "ws://localhost:{}", port);
        Ok(Self {
            clients,
            port,
            stopped,
        })
    }

    /// Notifier for the task context.
    pub fn handle(&self) -> ReloadHandle {
        ReloadHandle::new(Arc::clone(&self.clients))
    }

    /// Actual bound port (may differ from the requested one).
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop accepting and drop all client connections.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.clients.lock().clear();
    }
}

impl Drop for ReloadServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(listener: &TcpListener, clients: &ClientList, stopped: &AtomicBool) {
    loop {
        if stopped.load(Ordering::SeqCst) || crate::core::is_shutdown() {
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("reload"; "client connected: {}", addr);

                // Blocking mode for the handshake
                let _ = stream.set_nonblocking(false);
                match tungstenite::accept(stream) {
                    Ok(mut ws) => {
                        let greeting = ReloadMessage::connected().to_json();
                        if let Err(e) = ws.send(Message::Text(greeting.into())) {
                            crate::log!("reload"; "failed to greet client: {}", e);
                            continue;
                        }
                        clients.lock().push(ws);
                    }
                    Err(e) => {
                        crate::log!("reload"; "handshake failed: {}", e);
                    }
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                crate::log!("reload"; "accept error: {}", e);
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}

/// Try binding to port, retry with incremented port if in use.
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind live-reload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_retries_busy_port() {
        // Occupy a port, then ask the server to start on it
        let (busy, port) = try_bind_port(47100, 10).unwrap();
        let server = ReloadServer::start(port).unwrap();
        assert_ne!(server.port(), port);
        drop(busy);
    }

    #[test]
    fn test_handle_with_no_clients_is_quiet() {
        let server = ReloadServer::start(47200).unwrap();
        let handle = server.handle();
        assert_eq!(handle.client_count(), 0);
        // Broadcast into the void must not panic or block
        handle.notify_reload("views");
        handle.notify_css("/stylesheets/app.css");
        server.stop();
    }
}
