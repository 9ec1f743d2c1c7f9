//! `[paths]` section: the asset group path table.
//!
//! Maps each asset group (styles, scripts, images, fonts, views, root
//! files) to a source directory and a destination directory. Defined once
//! at startup, immutable for the process lifetime.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "app"
//! output = "dist"
//!
//! [paths.styles]
//! source = "app/stylesheets"
//! dest = "dist/stylesheets"
//! ```
//!
//! Invariant: the destination trees of styles/scripts/images/fonts are
//! pairwise disjoint, so parallel tasks never write into each other's
//! output. `validate()` enforces this at load time.

use anyhow::{Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One category of static asset with its own source/destination mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetGroup {
    Styles,
    Scripts,
    Images,
    Fonts,
    Views,
    RootFiles,
}

impl AssetGroup {
    /// All groups, in build-task order.
    pub const ALL: [AssetGroup; 6] = [
        AssetGroup::Images,
        AssetGroup::Fonts,
        AssetGroup::Styles,
        AssetGroup::Scripts,
        AssetGroup::Views,
        AssetGroup::RootFiles,
    ];

    /// Task/display name for the group.
    pub fn name(self) -> &'static str {
        match self {
            AssetGroup::Styles => "styles",
            AssetGroup::Scripts => "scripts",
            AssetGroup::Images => "images",
            AssetGroup::Fonts => "fonts",
            AssetGroup::Views => "views",
            AssetGroup::RootFiles => "root-files",
        }
    }

    /// Source file extensions the group claims.
    ///
    /// An empty slice means "any file" (views watch every file under the
    /// views tree: layouts, partials, helpers and data all count).
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AssetGroup::Styles => &["css"],
            AssetGroup::Scripts => &["js", "mjs"],
            AssetGroup::Images => &["jpg", "jpeg", "png", "gif", "webp"],
            AssetGroup::Fonts => &["woff", "woff2"],
            AssetGroup::Views => &[],
            AssetGroup::RootFiles => &[],
        }
    }

    /// Check whether a file extension belongs to this group.
    pub fn matches_extension(self, path: &Path) -> bool {
        let exts = self.extensions();
        if exts.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| exts.iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source directory / destination directory pair for one asset group.
#[derive(Debug, Clone, Deserialize)]
pub struct PathEntry {
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl PathEntry {
    fn new(source: &str, dest: &str) -> Self {
        Self {
            source: PathBuf::from(source),
            dest: PathBuf::from(dest),
        }
    }
}

/// Views source tree: pages, layouts, partials, helpers, data.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewPaths {
    /// Root of the views tree (`app/views`).
    pub source: PathBuf,
    /// Destination root for rendered pages (the output root).
    pub dest: PathBuf,
}

impl ViewPaths {
    pub fn pages(&self) -> PathBuf {
        self.source.join("pages")
    }
    pub fn layouts(&self) -> PathBuf {
        self.source.join("layouts")
    }
    pub fn partials(&self) -> PathBuf {
        self.source.join("partials")
    }
    pub fn helpers(&self) -> PathBuf {
        self.source.join("helpers")
    }
    pub fn data(&self) -> PathBuf {
        self.source.join("data")
    }
}

/// The full path table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathTable {
    /// Source root; root files (`app/*.*`, incl. CNAME) are copied from here.
    pub source: PathBuf,
    /// Destination root; the deploy step publishes this tree.
    pub output: PathBuf,

    pub styles: PathEntry,
    pub scripts: PathEntry,
    pub images: PathEntry,
    pub fonts: PathEntry,
    pub views: ViewPaths,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            source: PathBuf::from("app"),
            output: PathBuf::from("dist"),
            styles: PathEntry::new("app/stylesheets", "dist/stylesheets"),
            scripts: PathEntry::new("app/scripts", "dist/scripts"),
            images: PathEntry::new("app/assets/images", "dist/assets/images"),
            fonts: PathEntry::new("app/assets/fonts", "dist/assets/fonts"),
            views: ViewPaths {
                source: PathBuf::from("app/views"),
                dest: PathBuf::from("dist"),
            },
        }
    }
}

impl PathTable {
    /// Make every path absolute relative to the project root.
    pub fn normalize(&mut self, root: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&p);
            }
        };
        join(&mut self.source);
        join(&mut self.output);
        for entry in [
            &mut self.styles,
            &mut self.scripts,
            &mut self.images,
            &mut self.fonts,
        ] {
            join(&mut entry.source);
            join(&mut entry.dest);
        }
        join(&mut self.views.source);
        join(&mut self.views.dest);
    }

    /// Validate the table invariants.
    ///
    /// - every destination lives under the output root
    /// - the styles/scripts/images/fonts destination trees are pairwise
    ///   disjoint (neither contains the other)
    pub fn validate(&self) -> Result<()> {
        let named = self.named_dests();

        for (group, dest) in &named {
            if !dest.starts_with(&self.output) && *dest != self.output {
                bail!(
                    "[paths] {} destination {} is outside the output root {}",
                    group,
                    dest.display(),
                    self.output.display()
                );
            }
        }

        for (i, (group_a, a)) in named.iter().enumerate() {
            for (group_b, b) in named.iter().skip(i + 1) {
                if a.starts_with(b) || b.starts_with(a) {
                    bail!(
                        "[paths] destination trees for {} and {} overlap ({} vs {})",
                        group_a,
                        group_b,
                        a.display(),
                        b.display()
                    );
                }
            }
        }
        Ok(())
    }

    fn named_dests(&self) -> [(AssetGroup, &Path); 4] {
        [
            (AssetGroup::Styles, self.styles.dest.as_path()),
            (AssetGroup::Scripts, self.scripts.dest.as_path()),
            (AssetGroup::Images, self.images.dest.as_path()),
            (AssetGroup::Fonts, self.fonts.dest.as_path()),
        ]
    }

    /// Source directory for a group.
    pub fn source_of(&self, group: AssetGroup) -> &Path {
        match group {
            AssetGroup::Styles => &self.styles.source,
            AssetGroup::Scripts => &self.scripts.source,
            AssetGroup::Images => &self.images.source,
            AssetGroup::Fonts => &self.fonts.source,
            AssetGroup::Views => &self.views.source,
            AssetGroup::RootFiles => &self.source,
        }
    }

    /// Destination directory for a group.
    pub fn dest_of(&self, group: AssetGroup) -> &Path {
        match group {
            AssetGroup::Styles => &self.styles.dest,
            AssetGroup::Scripts => &self.scripts.dest,
            AssetGroup::Images => &self.images.dest,
            AssetGroup::Fonts => &self.fonts.dest,
            AssetGroup::Views => &self.views.dest,
            AssetGroup::RootFiles => &self.output,
        }
    }

    /// Classify a changed file to the asset group that owns it.
    ///
    /// The four leaf groups match by source-directory prefix plus extension
    /// filter; any file under the views tree belongs to views; a file
    /// directly inside the source root belongs to root files. Output-tree
    /// paths never classify (so a build can't re-trigger itself).
    pub fn classify(&self, path: &Path) -> Option<AssetGroup> {
        if path.starts_with(&self.output) {
            return None;
        }

        for group in [
            AssetGroup::Styles,
            AssetGroup::Scripts,
            AssetGroup::Images,
            AssetGroup::Fonts,
        ] {
            if path.starts_with(self.source_of(group)) && group.matches_extension(path) {
                return Some(group);
            }
        }

        if path.starts_with(&self.views.source) {
            return Some(AssetGroup::Views);
        }

        // Top-level files in the source root (CNAME, robots.txt, favicon...)
        if path.parent() == Some(self.source.as_path()) {
            return Some(AssetGroup::RootFiles);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PathTable {
        let mut table = PathTable::default();
        table.normalize(Path::new("/project"));
        table
    }

    #[test]
    fn test_default_dests_are_disjoint() {
        table().validate().expect("default table must validate");
    }

    #[test]
    fn test_overlapping_dests_rejected() {
        let mut table = table();
        table.scripts.dest = table.styles.dest.join("js");
        let err = table.validate().unwrap_err().to_string();
        assert!(err.contains("overlap"), "unexpected error: {err}");
    }

    #[test]
    fn test_dest_outside_output_rejected() {
        let mut table = table();
        table.fonts.dest = PathBuf::from("/elsewhere/fonts");
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_classify_script_change() {
        let table = table();
        // A script change maps to exactly the scripts group
        let path = Path::new("/project/app/scripts/nav/menu.js");
        assert_eq!(table.classify(path), Some(AssetGroup::Scripts));
        for group in [AssetGroup::Styles, AssetGroup::Images, AssetGroup::Fonts] {
            assert!(!path.starts_with(table.source_of(group)));
        }
    }

    #[test]
    fn test_classify_views_any_extension() {
        let table = table();
        assert_eq!(
            table.classify(Path::new("/project/app/views/data/site.json")),
            Some(AssetGroup::Views)
        );
        assert_eq!(
            table.classify(Path::new("/project/app/views/layouts/default.html")),
            Some(AssetGroup::Views)
        );
    }

    #[test]
    fn test_classify_root_file() {
        let table = table();
        assert_eq!(
            table.classify(Path::new("/project/app/CNAME")),
            Some(AssetGroup::RootFiles)
        );
        // Nested non-asset files do not classify
        assert_eq!(table.classify(Path::new("/project/app/notes/todo.txt")), None);
    }

    #[test]
    fn test_classify_ignores_output_tree() {
        let table = table();
        assert_eq!(
            table.classify(Path::new("/project/dist/stylesheets/app.css")),
            None
        );
    }

    #[test]
    fn test_classify_extension_filter() {
        let table = table();
        // A .txt inside the images tree is not an image change
        assert_eq!(
            table.classify(Path::new("/project/app/assets/images/readme.txt")),
            None
        );
    }

    #[test]
    fn test_view_subdirs() {
        let table = table();
        assert_eq!(
            table.views.pages(),
            Path::new("/project/app/views/pages")
        );
        assert_eq!(table.views.data(), Path::new("/project/app/views/data"));
    }
}
