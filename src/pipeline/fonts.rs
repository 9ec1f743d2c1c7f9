//! Fonts task: copy woff/woff2 verbatim.

use anyhow::{Context, Result};
use std::fs;

use super::TaskContext;
use crate::config::AssetGroup;
use crate::freshness::output_is_fresh;
use crate::utils::fs::{collect_files, ensure_parent, rebase};
use crate::{debug, log};

pub fn run(ctx: &TaskContext) -> Result<()> {
    let group = AssetGroup::Fonts;
    let source_dir = ctx.config.paths.source_of(group);
    let dest_dir = ctx.config.paths.dest_of(group);

    let files = collect_files(source_dir, |p| group.matches_extension(p));
    let mut copied = 0usize;

    for source in &files {
        let output = rebase(source, source_dir, dest_dir)?;
        if output_is_fresh(source, &output) {
            debug!("fonts"; "fresh: {}", ctx.config.relative_path(source).display());
            continue;
        }

        ensure_parent(&output)?;
        fs::copy(source, &output)
            .with_context(|| format!("failed to copy {}", source.display()))?;
        copied += 1;
    }

    if copied > 0 {
        log!("fonts"; "copied {} file(s)", copied);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::BuildMode;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> TaskContext {
        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();
        config.paths.normalize(dir.path());
        TaskContext::silent(Arc::new(config), BuildMode::Development)
    }

    #[test]
    fn test_copies_fonts_only() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let source = ctx.config.paths.source_of(AssetGroup::Fonts).to_path_buf();
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("body.woff2"), "font").unwrap();
        fs::write(source.join("notes.txt"), "not a font").unwrap();

        run(&ctx).unwrap();

        let dest = ctx.config.paths.dest_of(AssetGroup::Fonts);
        assert!(dest.join("body.woff2").exists());
        assert!(!dest.join("notes.txt").exists());
    }

    #[test]
    fn test_incremental_skip() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let source = ctx.config.paths.source_of(AssetGroup::Fonts).to_path_buf();
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("body.woff"), "v1").unwrap();

        run(&ctx).unwrap();
        let output = ctx.config.paths.dest_of(AssetGroup::Fonts).join("body.woff");
        let first_mtime = fs::metadata(&output).unwrap().modified().unwrap();

        // Unchanged source: second run leaves the output untouched
        run(&ctx).unwrap();
        assert_eq!(
            fs::metadata(&output).unwrap().modified().unwrap(),
            first_mtime
        );
    }

    #[test]
    fn test_missing_source_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        run(&ctx).unwrap();
    }
}
