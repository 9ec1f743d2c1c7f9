//! Public tunnel exposure for the dev server.
//!
//! When `[serve] tunnel` (or `PAVER_TUNNEL=true`) is set, the configured
//! tunnel client runs as a child process against the bound local URL. The
//! client's output is scanned for the public URL and surfaced in the log.

use anyhow::Result;
use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::process::Child;

use crate::config::PipelineConfig;
use crate::log;
use crate::utils::exec::{Cmd, find_binary};

/// Start the tunnel client when enabled.
///
/// Returns the child process handle to keep the tunnel alive; `None` when
/// tunneling is disabled or the client binary is missing (logged, not
/// fatal - the local server keeps working).
pub fn maybe_start(config: &PipelineConfig, addr: SocketAddr) -> Option<Child> {
    if !config.serve.tunnel_enabled() {
        return None;
    }

    match start(config, addr) {
        Ok(child) => Some(child),
        Err(e) => {
            log!("tunnel"; "not started: {e:#}");
            None
        }
    }
}

fn start(config: &PipelineConfig, addr: SocketAddr) -> Result<Child> {
    let command = &config.serve.tunnel_command;
    let program = command
        .first()
        .ok_or_else(|| anyhow::anyhow!("[serve] tunnel_command is empty"))?;

    let binary = find_binary(program)
        .ok_or_else(|| anyhow::anyhow!("tunnel client '{program}' not found on PATH"))?;

    let local_url = format!("http://{addr}");
    let mut child = Cmd::new(&binary)
        .args(&command[1..])
        .arg(&local_url)
        .spawn()?;

    log!("tunnel"; "starting {} for {}", program, local_url);

    // Surface the public URL from the client's output
    for stream in [
        child.stdout.take().map(|s| Box::new(s) as Box<dyn std::io::Read + Send>),
        child.stderr.take().map(|s| Box::new(s) as Box<dyn std::io::Read + Send>),
    ]
    .into_iter()
    .flatten()
    {
        std::thread::spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.lines().map_while(Result::ok) {
                if line.contains("https://") {
                    log!("tunnel"; "{}", line.trim());
                }
            }
        });
    }

    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_disabled_by_default() {
        let config = PipelineConfig::default();
        let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
        assert!(maybe_start(&config, addr).is_none());
    }

    #[test]
    fn test_missing_binary_is_not_fatal() {
        let mut config = PipelineConfig::default();
        config.serve.tunnel = true;
        config.serve.tunnel_command = vec!["paver-no-such-tunnel-client".into()];
        let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();
        assert!(maybe_start(&config, addr).is_none());
    }
}
