//! Shared utilities.

pub mod exec;
pub mod fs;
pub mod mime;

use std::path::{Path, PathBuf};

/// Expand a leading `~` in a path (token files, tunnel binaries).
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    PathBuf::from(shellexpand::tilde(s).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_plain_path() {
        let p = Path::new("/etc/hosts");
        assert_eq!(expand_tilde(p), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_expand_tilde_home() {
        let expanded = expand_tilde(Path::new("~/.token"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }
}
