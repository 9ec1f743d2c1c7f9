//! Styles task: bundle, lower, prefix, and (in production) minify CSS.
//!
//! Every non-partial stylesheet (name not starting with `_`) compiles
//! independently: `@import`s are bundled in, modern syntax is lowered for
//! the browser targets (vendor prefixes included), production minifies.
//! The manifest stylesheet `application.css` lands as `app.css`.
//!
//! A syntax error in one stylesheet is reported and the remaining
//! stylesheets still compile - one broken file never takes down the task.

use anyhow::{Context, Result, anyhow};
use lightningcss::bundler::{Bundler, FileProvider};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions};
use lightningcss::targets::{Browsers, Targets};
use std::fs;
use std::path::{Path, PathBuf};

use super::TaskContext;
use crate::config::AssetGroup;
use crate::utils::fs::{collect_files, ensure_parent, rebase};
use crate::log;

/// Browser targets the compiled CSS must support (drives lowering and
/// vendor prefixing).
fn browser_targets() -> Browsers {
    Browsers {
        chrome: Some(80 << 16),
        edge: Some(80 << 16),
        firefox: Some(78 << 16),
        safari: Some(11 << 16),
        ..Browsers::default()
    }
}

pub fn run(ctx: &TaskContext) -> Result<()> {
    let group = AssetGroup::Styles;
    let source_dir = ctx.config.paths.source_of(group);
    let dest_dir = ctx.config.paths.dest_of(group);

    let files = collect_files(source_dir, |p| {
        group.matches_extension(p) && !is_partial(p)
    });

    let minify = ctx.mode.is_production();
    let mut written = Vec::new();

    for source in &files {
        let code = match compile(source, minify) {
            Ok(code) => code,
            Err(e) => {
                ctx.notifier.transform_error("styles", &format!("{e:#}"));
                continue;
            }
        };

        let output = output_path(source, source_dir, dest_dir)?;
        ensure_parent(&output)?;
        fs::write(&output, code)
            .with_context(|| format!("failed to write {}", output.display()))?;
        written.push(output);
    }

    if !written.is_empty() {
        log!("styles"; "compiled {} stylesheet(s)", written.len());
    }

    // In-place style injection for connected clients
    if let Some(reload) = ctx.reload() {
        for output in &written {
            reload.notify_css(&url_path(ctx.config.output_root(), output));
        }
    }

    Ok(())
}

/// Bundle and compile one stylesheet to its final text.
fn compile(source: &Path, minify: bool) -> Result<String> {
    let provider = FileProvider::new();
    let mut bundler = Bundler::new(&provider, None, ParserOptions::default());
    let mut stylesheet = bundler
        .bundle(source)
        .map_err(|e| anyhow!("{}: {}", source.display(), e))?;

    let targets = Targets::from(browser_targets());
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{}: {}", source.display(), e))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{}: {}", source.display(), e))?;

    Ok(result.code)
}

/// Partials (`_reset.css`) only exist to be `@import`ed.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Destination path, renaming the `application` manifest to `app.css`.
fn output_path(source: &Path, source_dir: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let mut output = rebase(source, source_dir, dest_dir)?;
    if output.file_stem().is_some_and(|s| s == "application") {
        output.set_file_name("app.css");
    }
    Ok(output)
}

/// Browser-facing URL path for a file under the output root.
fn url_path(output_root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(output_root).unwrap_or(file);
    let mut url = String::new();
    for component in relative.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::BuildMode;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir, mode: BuildMode) -> TaskContext {
        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();
        config.paths.normalize(dir.path());
        TaskContext::silent(Arc::new(config), mode)
    }

    fn styles_dir(ctx: &TaskContext) -> PathBuf {
        let dir = ctx.config.paths.source_of(AssetGroup::Styles).to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_manifest_renamed_and_imports_bundled() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, BuildMode::Development);
        let styles = styles_dir(&ctx);
        fs::write(styles.join("_base.css"), "body { margin: 0 }").unwrap();
        fs::write(
            styles.join("application.css"),
            "@import \"_base.css\";\nh1 { color: red }",
        )
        .unwrap();

        run(&ctx).unwrap();

        let dest = ctx.config.paths.dest_of(AssetGroup::Styles);
        let out = fs::read_to_string(dest.join("app.css")).unwrap();
        assert!(out.contains("margin"));
        assert!(out.contains("color"));
        // The partial itself did not compile standalone
        assert!(!dest.join("_base.css").exists());
    }

    #[test]
    fn test_production_is_smaller_or_equal() {
        let source = "h1 {\n  color: #ff0000;\n  margin: 0px;\n}\n";
        for mode in [BuildMode::Development, BuildMode::Production] {
            let dir = TempDir::new().unwrap();
            let ctx = context(&dir, mode);
            let styles = styles_dir(&ctx);
            fs::write(styles.join("site.css"), source).unwrap();
            run(&ctx).unwrap();
        }

        // Compile both ways directly for a byte comparison
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.css");
        fs::write(&path, source).unwrap();
        let dev = compile(&path, false).unwrap();
        let prod = compile(&path, true).unwrap();
        assert!(prod.len() <= dev.len());
        assert!(!prod.contains('\n'));
    }

    #[test]
    fn test_invalid_stylesheet_isolated() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, BuildMode::Development);
        let styles = styles_dir(&ctx);
        fs::write(styles.join("good.css"), "p { color: blue }").unwrap();
        fs::write(styles.join("bad.css"), "} p { color: blue }").unwrap();

        // Task completes despite the broken stylesheet
        run(&ctx).unwrap();

        let dest = ctx.config.paths.dest_of(AssetGroup::Styles);
        assert!(dest.join("good.css").exists());
        assert!(!dest.join("bad.css").exists());
        // ...and the error was reported, not silently dropped
        assert_eq!(ctx.notifier.raised(), 1);
    }

    #[test]
    fn test_url_path() {
        assert_eq!(
            url_path(Path::new("/p/dist"), Path::new("/p/dist/stylesheets/app.css")),
            "/stylesheets/app.css"
        );
    }
}
