//! Mtime-based freshness detection for incremental task runs.
//!
//! Each asset task skips a source file whose destination output is newer
//! than the source. Both files are plain filesystem artifacts written by
//! paver itself, so modification times are reliable here.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file.
///
/// Returns `None` if the file doesn't exist or mtime cannot be read.
pub fn mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// Check whether `output` is up to date with respect to `source`.
///
/// `true` means the output exists and is at least as new as the source, so
/// the transformation can be skipped.
pub fn output_is_fresh(source: &Path, output: &Path) -> bool {
    let (Some(source_time), Some(output_time)) = (mtime(source), mtime(output)) else {
        return false;
    };
    output_time >= source_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_output_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.css");
        fs::write(&source, "x").unwrap();
        assert!(!output_is_fresh(&source, &dir.path().join("b.css")));
    }

    #[test]
    fn test_newer_output_is_fresh() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.css");
        let output = dir.path().join("b.css");
        fs::write(&source, "x").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&output, "y").unwrap();
        assert!(output_is_fresh(&source, &output));
    }

    #[test]
    fn test_modified_source_is_stale() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.css");
        let output = dir.path().join("b.css");
        fs::write(&output, "y").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        fs::write(&source, "x").unwrap();
        assert!(!output_is_fresh(&source, &output));
    }
}
