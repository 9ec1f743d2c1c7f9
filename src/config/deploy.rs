//! `[deploy]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [deploy]
//! url = "https://github.com/user/user.github.io"  # Repository URL
//! branch = "gh-pages"                             # Target branch
//! token_path = "~/.github-token"                  # Optional: PAT file path
//! force = true                                    # Force push
//! ```

use anyhow::{Result, bail};
use serde::Deserialize;
use std::path::PathBuf;

/// Publish target settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Repository URL (HTTPS or SSH format).
    pub url: String,

    /// Target branch for the published tree (e.g., "gh-pages").
    pub branch: String,

    /// Path to a file containing an access token.
    ///
    /// Store it outside the repository (e.g., `~/.github-token`);
    /// never commit tokens to version control.
    pub token_path: Option<PathBuf>,

    /// Force push (overwrites remote history).
    pub force: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            branch: "gh-pages".to_string(),
            token_path: None,
            force: true,
        }
    }
}

impl DeployConfig {
    /// Validate the deploy section before publishing.
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("[deploy] url is not configured");
        }
        if self.branch.trim().is_empty() {
            bail!("[deploy] branch cannot be empty");
        }
        if let Some(path) = &self.token_path {
            let expanded = crate::utils::expand_tilde(path);
            if !expanded.is_file() {
                bail!("[deploy] token file not found: {}", expanded.display());
            }
        }
        Ok(())
    }
}
