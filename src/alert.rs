//! Developer alert channel for transformation errors.
//!
//! A transformation error (bad stylesheet syntax, broken template) must be
//! loud but non-fatal: colored console output, a terminal bell, and a
//! best-effort desktop notification when a notifier binary is on PATH.
//! Filesystem errors do NOT go through here - they propagate.

use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::utils::exec::{Cmd, find_binary};

/// Desktop notifier backend, detected once at startup.
#[derive(Debug, Clone)]
enum DesktopBackend {
    /// `notify-send` (Linux)
    NotifySend(PathBuf),
    /// `osascript` (macOS)
    OsaScript(PathBuf),
}

/// Process-scoped alert channel.
///
/// Cheap to construct; owned by the task context and shared by reference.
#[derive(Debug)]
pub struct Notifier {
    desktop: Option<DesktopBackend>,
    /// Number of alerts raised, for task reports and tests.
    raised: AtomicUsize,
}

impl Notifier {
    /// Detect the available desktop notifier.
    pub fn new() -> Self {
        let desktop = find_binary("notify-send")
            .map(DesktopBackend::NotifySend)
            .or_else(|| find_binary("osascript").map(DesktopBackend::OsaScript));
        Self {
            desktop,
            raised: AtomicUsize::new(0),
        }
    }

    /// Console-only channel (tests, CI).
    pub fn silent() -> Self {
        Self {
            desktop: None,
            raised: AtomicUsize::new(0),
        }
    }

    /// Report a transformation error for `task`.
    ///
    /// Never fails and never panics: alerting about an error must not turn
    /// into a second error.
    pub fn transform_error(&self, task: &str, error: &str) {
        self.raised.fetch_add(1, Ordering::Relaxed);

        let prefix = format!("[{task} error]").on_red().white().bold().to_string();
        crate::logger::log("error", &format!("{prefix} {}", error.red()));

        ring_bell();

        if let Some(backend) = &self.desktop {
            let summary = format!("{task} failed, check the logs..");
            send_desktop(backend, &summary);
        }
    }

    /// Alerts raised so far.
    pub fn raised(&self) -> usize {
        self.raised.load(Ordering::Relaxed)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

fn ring_bell() {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

fn send_desktop(backend: &DesktopBackend, summary: &str) {
    let result = match backend {
        DesktopBackend::NotifySend(bin) => Cmd::new(bin).arg("paver").arg(summary).run(),
        DesktopBackend::OsaScript(bin) => Cmd::new(bin)
            .arg("-e")
            .arg(format!(
                "display notification \"{}\" with title \"paver\"",
                summary.replace('"', "'")
            ))
            .run(),
    };
    if let Err(e) = result {
        crate::debug!("alert"; "desktop notification failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_notifier_counts() {
        let notifier = Notifier::silent();
        assert_eq!(notifier.raised(), 0);
        notifier.transform_error("styles", "unexpected token");
        notifier.transform_error("scripts", "unterminated string");
        assert_eq!(notifier.raised(), 2);
    }
}
