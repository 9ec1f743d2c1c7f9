//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 3000                 # HTTP port number
//! watch = true                # Re-run asset tasks on file changes
//! tunnel = false              # Expose through a public tunnel client
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.
//! `PAVER_TUNNEL=true` overrides `tunnel` at runtime.

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Enable the file watcher for live reload.
    pub watch: bool,

    /// Expose the server through a public tunnel.
    pub tunnel: bool,

    /// Tunnel client command; the bound local URL is appended.
    pub tunnel_command: Vec<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 3000,
            watch: true,
            tunnel: false,
            tunnel_command: vec!["cloudflared".into(), "tunnel".into(), "--url".into()],
        }
    }
}

impl ServeConfig {
    /// Tunnel enabled via config or the `PAVER_TUNNEL` environment flag.
    pub fn tunnel_enabled(&self) -> bool {
        if self.tunnel {
            return true;
        }
        matches!(std::env::var("PAVER_TUNNEL"), Ok(v) if v == "true" || v == "1")
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config =
            test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080\nwatch = false");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 3000);
        assert!(config.serve.watch);
        assert!(!config.serve.tunnel);
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nport = 5000");

        assert_eq!(config.serve.port, 5000);
        assert!(config.serve.watch);
    }

    #[test]
    fn test_tunnel_command_override() {
        let config = test_parse_config(
            "[serve]\ntunnel = true\ntunnel_command = [\"ssh\", \"-R\", \"80:localhost\"]",
        );
        assert!(config.serve.tunnel_enabled());
        assert_eq!(config.serve.tunnel_command[0], "ssh");
    }
}
