//! Pipeline configuration management for `paver.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── paths    # [paths] - the asset group path table
//! ├── serve    # [serve] - development server settings
//! ├── deploy   # [deploy] - publish target settings
//! ├── handle   # Global config handle (arc-swap)
//! └── mod.rs   # PipelineConfig (this file)
//! ```
//!
//! Every field has a default mirroring the fixed `app/` → `dist/` layout
//! contract, so a project without `paver.toml` builds out of the box.

mod deploy;
mod handle;
mod paths;
mod serve;

pub use deploy::DeployConfig;
pub use handle::{cfg, init_config};
pub use paths::{AssetGroup, PathEntry, PathTable, ViewPaths};
pub use serve::ServeConfig;

use crate::cli::Cli;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing paver.toml
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Asset group path table
    pub paths: PathTable,

    /// Development server settings
    pub serve: ServeConfig,

    /// Deployment settings
    pub deploy: DeployConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; a missing file yields
    /// the default layout with the current directory as project root.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(config_path) => {
                let mut config = Self::from_path(&config_path)?;
                config.root = config_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| cwd.clone());
                config.config_path = config_path;
                config
            }
            None => {
                let mut config = Self::default();
                config.root = cwd;
                config
            }
        };

        config.paths.normalize(&config.root);
        config.paths.validate()?;
        Ok(config)
    }

    /// Parse a config file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse config from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("invalid paver.toml")?;
        Ok(config)
    }

    /// Absolute source root (`app/` by default).
    pub fn source_root(&self) -> &Path {
        &self.paths.source
    }

    /// Absolute destination root (`dist/` by default).
    pub fn output_root(&self) -> &Path {
        &self.paths.output
    }

    /// Path relative to the project root, for display.
    pub fn relative_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Search upward from `start` for the config file.
fn find_config_file(start: &Path, name: &Path) -> Option<PathBuf> {
    // An explicit path (with directory components) is used as-is.
    if name.components().count() > 1 {
        let path = if name.is_absolute() {
            name.to_path_buf()
        } else {
            start.join(name)
        };
        return path.is_file().then_some(path);
    }

    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> PipelineConfig {
    let mut config = PipelineConfig::parse(content).expect("config should parse");
    config.root = PathBuf::from("/project");
    config.paths.normalize(&config.root);
    config
}
