//! Root files task: copy `app/*.*` (dotfiles and CNAME included) to the
//! output root. These are the hosting-target files: CNAME, robots.txt,
//! favicon.ico, .nojekyll.

use anyhow::{Context, Result};
use std::fs;

use super::TaskContext;
use crate::freshness::output_is_fresh;
use crate::utils::fs::{ensure_parent, top_level_files};
use crate::{debug, log};

pub fn run(ctx: &TaskContext) -> Result<()> {
    let source_dir = ctx.config.source_root();
    let output_dir = ctx.config.output_root();

    let mut copied = 0usize;
    for source in top_level_files(source_dir)? {
        let name = match source.file_name() {
            Some(name) => name.to_owned(),
            None => continue,
        };
        let output = output_dir.join(&name);

        if output_is_fresh(&source, &output) {
            debug!("root-files"; "fresh: {}", name.to_string_lossy());
            continue;
        }

        ensure_parent(&output)?;
        fs::copy(&source, &output)
            .with_context(|| format!("failed to copy {}", source.display()))?;
        copied += 1;
    }

    if copied > 0 {
        log!("root-files"; "copied {} file(s)", copied);
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
    fn test_copies_cname_and_dotfiles_not_subdirs() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let app = ctx.config.source_root().to_path_buf();
        fs::create_dir_all(app.join("stylesheets")).unwrap();
        fs::write(app.join("CNAME"), "example.com").unwrap();
        fs::write(app.join(".nojekyll"), "").unwrap();
        fs::write(app.join("robots.txt"), "User-agent: *").unwrap();
        fs::write(app.join("stylesheets/site.css"), "").unwrap();

        run(&ctx).unwrap();

        let output = ctx.config.output_root();
        assert_eq!(
            fs::read_to_string(output.join("CNAME")).unwrap(),
            "example.com"
        );
        assert!(output.join(".nojekyll").exists());
        assert!(output.join("robots.txt").exists());
        // Subdirectory contents belong to other tasks
        assert!(!output.join("stylesheets").exists());
    }
}
