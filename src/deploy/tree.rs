//! Build a git tree from the destination directory.

use anyhow::{Context, Result};
use gix::objs::tree::{Entry, EntryKind};
use gix::objs::Tree;
use gix::{ObjectId, Repository};
use std::fs;
use std::path::Path;

/// Snapshot `dir` as a git tree, returning its object id.
///
/// `.git` is excluded; empty directories vanish (git does not track them).
pub fn write_tree(repo: &Repository, dir: &Path) -> Result<ObjectId> {
    let tree = build_tree(repo, dir)?;
    Ok(repo
        .write_object(&tree)
        .with_context(|| format!("failed to write tree for {}", dir.display()))?
        .detach())
}

fn build_tree(repo: &Repository, dir: &Path) -> Result<Tree> {
    let mut entries = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }
        let path = entry.path();
        let filename = gix::bstr::BString::from(name.to_string_lossy().into_owned());

        if path.is_dir() {
            let sub_tree = build_tree(repo, &path)?;
            if sub_tree.entries.is_empty() {
                continue;
            }
            let oid = repo.write_object(&sub_tree)?.detach();
            entries.push(Entry {
                mode: EntryKind::Tree.into(),
                filename,
                oid,
            });
        } else if path.is_file() {
            let data =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let oid = repo.write_blob(data)?.detach();
            entries.push(Entry {
                mode: EntryKind::Blob.into(),
                filename,
                oid,
            });
        }
    }

    // Git requires tree entries in its canonical sort order
    entries.sort();
    Ok(Tree { entries })
}
