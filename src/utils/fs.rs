//! Filesystem helpers: directory walking and file collection.

use anyhow::{Context, Result};
use jwalk::WalkDir;
use std::fs;
use std::path::{Path, PathBuf};

/// Recursively collect files under `dir` matching `filter`, sorted by path.
///
/// A missing directory yields an empty list: an asset group with no source
/// tree simply has nothing to do.
pub fn collect_files(dir: &Path, filter: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .skip_hidden(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| filter(path))
        .collect();
    files.sort();
    files
}

/// Top-level files of a directory (no recursion), dotfiles included.
pub fn top_level_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Create the parent directory of `path` if it does not exist.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Rebase `path` from the `from` directory into the `to` directory.
///
/// `rebase("/app/css/a/b.css", "/app/css", "/dist/css")` → `/dist/css/a/b.css`
pub fn rebase(path: &Path, from: &Path, to: &Path) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(from)
        .with_context(|| format!("{} is not under {}", path.display(), from.display()))?;
    Ok(to.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.css"), "").unwrap();
        fs::write(dir.path().join("a.css"), "").unwrap();
        fs::write(dir.path().join("sub/c.css"), "").unwrap();
        fs::write(dir.path().join("skip.txt"), "").unwrap();

        let files = collect_files(dir.path(), |p| {
            p.extension().is_some_and(|e| e == "css")
        });
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("a.css"),
                PathBuf::from("b.css"),
                PathBuf::from("sub/c.css")
            ]
        );
    }

    #[test]
    fn test_collect_files_missing_dir() {
        assert!(collect_files(Path::new("/no/such/dir"), |_| true).is_empty());
    }

    #[test]
    fn test_top_level_files_includes_dotfiles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CNAME"), "example.com").unwrap();
        fs::write(dir.path().join(".nojekyll"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/deep.txt"), "").unwrap();

        let files = top_level_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![".nojekyll", "CNAME"]);
    }

    #[test]
    fn test_rebase() {
        let out = rebase(
            Path::new("/app/css/a/b.css"),
            Path::new("/app/css"),
            Path::new("/dist/css"),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/dist/css/a/b.css"));
    }
}
