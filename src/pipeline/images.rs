//! Images task: recompress what the codec stack handles, copy the rest.
//!
//! jpg/jpeg and png are decoded and re-encoded at pipeline settings; the
//! smaller of original and re-encoded bytes wins, so optimization never
//! inflates an already-tight file. gif/webp pass through verbatim.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use std::fs;
use std::path::Path;

use super::TaskContext;
use crate::config::AssetGroup;
use crate::freshness::output_is_fresh;
use crate::utils::fs::{collect_files, ensure_parent, rebase};
use crate::{debug, log};

/// JPEG re-encode quality.
const JPEG_QUALITY: u8 = 82;

pub fn run(ctx: &TaskContext) -> Result<()> {
    let group = AssetGroup::Images;
    let source_dir = ctx.config.paths.source_of(group);
    let dest_dir = ctx.config.paths.dest_of(group);

    let files = collect_files(source_dir, |p| group.matches_extension(p));
    let mut written = 0usize;
    let mut saved = 0u64;

    for source in &files {
        let output = rebase(source, source_dir, dest_dir)?;
        if output_is_fresh(source, &output) {
            debug!("images"; "fresh: {}", ctx.config.relative_path(source).display());
            continue;
        }

        let original = fs::read(source)
            .with_context(|| format!("failed to read {}", source.display()))?;

        let bytes = match recompress(source, &original) {
            Ok(Some(recompressed)) if recompressed.len() < original.len() => {
                saved += (original.len() - recompressed.len()) as u64;
                recompressed
            }
            Ok(_) => original,
            Err(e) => {
                // Corrupt image: report and keep going with the other files
                ctx.notifier
                    .transform_error("images", &format!("{}: {e:#}", source.display()));
                continue;
            }
        };

        ensure_parent(&output)?;
        fs::write(&output, bytes)
            .with_context(|| format!("failed to write {}", output.display()))?;
        written += 1;
    }

    if written > 0 {
        log!("images"; "optimized {} file(s), saved {} bytes", written, saved);
    }
    Ok(())
}

/// Re-encode a decodable format; `None` means pass-through.
fn recompress(path: &Path, original: &[u8]) -> Result<Option<Vec<u8>>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let encoded = match ext.as_str() {
        "jpg" | "jpeg" => {
            let img = image::load_from_memory(original)?;
            let mut buf = Vec::new();
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
            Some(buf)
        }
        "png" => {
            let img = image::load_from_memory(original)?;
            let mut buf = Vec::new();
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                CompressionType::Best,
                FilterType::Adaptive,
            ))?;
            Some(buf)
        }
        // gif/webp: no lossy encoder in the stack, copy verbatim
        _ => None,
    };

    Ok(encoded)
}
