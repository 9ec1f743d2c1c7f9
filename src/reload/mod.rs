//! Live reload over WebSocket.
//!
//! An explicit, process-scoped server object: `start()` binds the
//! listener and begins accepting browser clients, `handle()` hands out a
//! cheap notifier for the tasks, `stop()` winds the acceptor down.
//! Stylesheet completions push an in-place `css` message; everything else
//! pushes a full `reload`.

pub mod message;
mod server;

pub use message::ReloadMessage;
pub use server::{DEFAULT_WS_PORT, ReloadServer};

use parking_lot::Mutex;
use std::net::TcpStream;
use std::sync::Arc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

/// Connected browser clients, shared between acceptor and notifiers.
pub(crate) type ClientList = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Cheap, clonable notifier handed to the task context.
#[derive(Clone)]
pub struct ReloadHandle {
    clients: ClientList,
}

impl ReloadHandle {
    pub(crate) fn new(clients: ClientList) -> Self {
        Self { clients }
    }

    /// Ask connected clients to swap a stylesheet in place.
    pub fn notify_css(&self, path: &str) {
        self.broadcast(&ReloadMessage::css(path));
    }

    /// Ask connected clients for a full page reload.
    pub fn notify_reload(&self, reason: &str) {
        self.broadcast(&ReloadMessage::reload(reason));
    }

    /// Number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    fn broadcast(&self, msg: &ReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        let text = Message::Text(msg.to_json().into());
        let count = clients.len();
        clients.retain_mut(|client| match client.send(text.clone()) {
            Ok(_) => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} client(s)", count);
    }
}
