//! Scripts task: normalize, minify (production), concatenate to `app.js`.
//!
//! Each source parses and re-generates through oxc; production adds
//! compression and mangling. Outputs concatenate in sorted path order, so
//! the bundle is deterministic. A file with syntax errors is reported and
//! left out of the bundle; the remaining files still ship.

use anyhow::{Context, Result};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use std::fs;

use super::TaskContext;
use crate::config::AssetGroup;
use crate::freshness::mtime;
use crate::utils::fs::{collect_files, ensure_parent};
use crate::{debug, log};

/// Name of the concatenated bundle.
const BUNDLE_NAME: &str = "app.js";

pub fn run(ctx: &TaskContext) -> Result<()> {
    let group = AssetGroup::Scripts;
    let source_dir = ctx.config.paths.source_of(group);
    let dest_dir = ctx.config.paths.dest_of(group);

    let files = collect_files(source_dir, |p| group.matches_extension(p));
    if files.is_empty() {
        return Ok(());
    }

    let output = dest_dir.join(BUNDLE_NAME);

    // The bundle depends on every source; rebuild when any is newer.
    if let Some(output_time) = mtime(&output) {
        let stale = files
            .iter()
            .any(|f| mtime(f).is_none_or(|t| t > output_time));
        if !stale {
            debug!("scripts"; "fresh: {}", ctx.config.relative_path(&output).display());
            return Ok(());
        }
    }

    let minify = ctx.mode.is_production();
    let mut parts = Vec::with_capacity(files.len());

    for source in &files {
        let code = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        match compile(&code, minify) {
            Ok(compiled) => parts.push(compiled),
            Err(message) => {
                ctx.notifier.transform_error(
                    "scripts",
                    &format!("{}: {}", source.display(), message),
                );
            }
        }
    }

    if parts.is_empty() {
        return Ok(());
    }

    ensure_parent(&output)?;
    let mut bundle = parts.join("\n");
    if !bundle.ends_with('\n') {
        bundle.push('\n');
    }
    fs::write(&output, bundle)
        .with_context(|| format!("failed to write {}", output.display()))?;

    log!("scripts"; "bundled {} file(s) into {}", parts.len(), BUNDLE_NAME);
    Ok(())
}

/// Parse and regenerate one source; production compresses and mangles.
fn compile(source: &str, minify: bool) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        return Err(messages.join("; "));
    }

    let mut program = ret.program;
    if minify {
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::smallest()),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        Ok(Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code)
    } else {
        Ok(Codegen::new().build(&program).code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::BuildMode;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir, mode: BuildMode) -> TaskContext {
        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();
        config.paths.normalize(dir.path());
        TaskContext::silent(Arc::new(config), mode)
    }

    fn scripts_dir(ctx: &TaskContext) -> PathBuf {
        let dir = ctx.config.paths.source_of(AssetGroup::Scripts).to_path_buf();
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_bundle_order_is_sorted() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, BuildMode::Development);
        let scripts = scripts_dir(&ctx);
        fs::write(scripts.join("b.js"), "const second = 2;").unwrap();
        fs::write(scripts.join("a.js"), "const first = 1;").unwrap();

        run(&ctx).unwrap();

        let bundle = fs::read_to_string(
            ctx.config.paths.dest_of(AssetGroup::Scripts).join("app.js"),
        )
        .unwrap();
        let first = bundle.find("first").unwrap();
        let second = bundle.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_production_minifies() {
        let source = "function add(left, right) {\n  return left + right;\n}\nexport { add };";
        let dev = compile(source, false).unwrap();
        let prod = compile(source, true).unwrap();
        assert!(prod.len() <= dev.len());
        assert!(dev.contains("left"));
        assert!(!prod.contains("\n  "));
    }

    #[test]
    fn test_syntax_error_isolated() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, BuildMode::Development);
        let scripts = scripts_dir(&ctx);
        fs::write(scripts.join("good.js"), "const ok = true;").unwrap();
        fs::write(scripts.join("bad.js"), "const = ;").unwrap();

        run(&ctx).unwrap();

        assert_eq!(ctx.notifier.raised(), 1);
        let bundle = fs::read_to_string(
            ctx.config.paths.dest_of(AssetGroup::Scripts).join("app.js"),
        )
        .unwrap();
        assert!(bundle.contains("ok"));
    }

    #[test]
    fn test_no_sources_no_bundle() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, BuildMode::Development);
        run(&ctx).unwrap();
        assert!(
            !ctx.config
                .paths
                .dest_of(AssetGroup::Scripts)
                .join("app.js")
                .exists()
        );
    }
}
