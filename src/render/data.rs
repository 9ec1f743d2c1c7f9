//! Structured data loading for the render context.
//!
//! Every `*.json` / `*.toml` file in the data directory becomes one
//! top-level context variable named after the file stem:
//! `data/site.json` -> `{{ site.title }}`.

use anyhow::{Context as _, Result, bail};
use std::fs;
use std::path::Path;

use crate::utils::fs::collect_files;

/// Load all data files into a tera context.
pub fn load(dir: &Path) -> Result<tera::Context> {
    let mut context = tera::Context::new();

    for path in collect_files(dir, is_data_file) {
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let value: serde_json::Value = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("{}: invalid JSON", path.display()))?,
            Some("toml") => {
                let value: toml::Value = toml::from_str(&content)
                    .with_context(|| format!("{}: invalid TOML", path.display()))?;
                serde_json::to_value(value)?
            }
            _ => bail!("unsupported data file: {}", path.display()),
        };

        context.insert(stem.as_str(), &value);
    }

    Ok(context)
}

fn is_data_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext == "json" || ext == "toml")
}
