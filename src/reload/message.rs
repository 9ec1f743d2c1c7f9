//! Live-reload message protocol.
//!
//! JSON messages over WebSocket between the dev server and browser
//! clients:
//!
//! - `reload`: full page reload
//! - `css`: swap one stylesheet in place (no layout flash)
//! - `connected`: handshake greeting with the server version

use serde::{Deserialize, Serialize};

/// Message sent to live-reload clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Full page reload.
    Reload {
        /// What changed (task name), for client-side logging.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// In-place stylesheet swap.
    Css {
        /// Browser-facing stylesheet path, e.g. `/stylesheets/app.css`.
        path: String,
    },

    /// Connection established.
    Connected {
        /// Server version for compatibility checks.
        version: String,
    },
}

impl ReloadMessage {
    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON; falls back to a bare reload on failure.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_message_roundtrip() {
        let msg = ReloadMessage::css("/stylesheets/app.css");
        let json = msg.to_json();
        assert!(json.contains(r#""type":"css""#));
        assert!(json.contains(r#""path":"/stylesheets/app.css""#));
        assert_eq!(ReloadMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn test_reload_message_carries_reason() {
        let json = ReloadMessage::reload("scripts").to_json();
        assert!(json.contains(r#""type":"reload""#));
        assert!(json.contains(r#""reason":"scripts""#));
    }

    #[test]
    fn test_connected_includes_version() {
        let json = ReloadMessage::connected().to_json();
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
