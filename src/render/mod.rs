//! Page rendering: pages + layouts + partials + data -> standalone HTML.
//!
//! The renderer is an explicit, process-scoped context object. It holds the
//! parsed layout/partial set and the loaded data files; `invalidate()`
//! drops all of that cached parse state so layout/partial/data edits are
//! picked up on the next render even though the page files themselves did
//! not change.
//!
//! Rendering model:
//! - a page is an HTML file under `views/pages/`, optionally starting with
//!   TOML front matter (`+++` fences) that selects a layout and binds
//!   page-local variables
//! - the page body renders first (partials and data in scope), then the
//!   selected layout renders with the page result bound as `content`
//! - layout `default` is assumed when front matter names none; a project
//!   with no layouts at all gets the bare page body
//!
//! Pages parse independently of each other: one broken page fails only
//! that page. A broken layout or partial fails the shared template set and
//! with it the whole views task (reported, not fatal).

mod data;
mod helpers;
pub mod minify;

use anyhow::{Context as _, Result, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

use crate::config::ViewPaths;
use crate::utils::fs::collect_files;

/// A rendered page: destination-relative path plus markup.
#[derive(Debug)]
pub struct RenderedPage {
    pub relative: PathBuf,
    pub html: String,
}

/// Renderer context object with explicit cache invalidation.
pub struct PageRenderer {
    views: ViewPaths,
    tera: Tera,
    data: tera::Context,
}

impl PageRenderer {
    /// Build the renderer: parse layouts/partials, load data files.
    pub fn new(views: ViewPaths) -> Result<Self> {
        let (tera, data) = load(&views)?;
        Ok(Self { views, tera, data })
    }

    /// Drop all cached parse state and reload from disk.
    pub fn invalidate(&mut self) -> Result<()> {
        let (tera, data) = load(&self.views)?;
        self.tera = tera;
        self.data = data;
        Ok(())
    }

    /// All page source files, sorted.
    pub fn page_files(&self) -> Vec<PathBuf> {
        collect_files(&self.views.pages(), is_html)
    }

    /// Render one page file to markup.
    pub fn render_page(&mut self, page: &Path) -> Result<RenderedPage> {
        let source = fs::read_to_string(page)
            .with_context(|| format!("failed to read {}", page.display()))?;
        let relative = page
            .strip_prefix(self.views.pages())
            .map(Path::to_path_buf)
            .with_context(|| format!("{} is not a page file", page.display()))?;

        let (front, body) = split_front_matter(&source);
        let front = parse_front_matter(front, page)?;

        let mut context = self.data.clone();
        if let Some(table) = &front.extra {
            for (key, value) in table {
                context.insert(key.as_str(), value);
            }
        }
        context.insert("page", &relative.to_string_lossy());

        let body_html = self
            .tera
            .render_str(body, &context)
            .map_err(|e| render_error(page, &e))?;

        let layout = front.layout.as_deref().unwrap_or("default");
        let layout_name = format!("layouts/{layout}.html");

        if !self.has_template(&layout_name) {
            // No layouts in the project at all: the page stands alone.
            if front.layout.is_none() && !self.has_layouts() {
                return Ok(RenderedPage {
                    relative,
                    html: body_html,
                });
            }
            bail!("{}: layout '{}' not found", page.display(), layout);
        }

        context.insert("content", &body_html);
        let html = self
            .tera
            .render(&layout_name, &context)
            .map_err(|e| render_error(page, &e))?;

        Ok(RenderedPage { relative, html })
    }

    fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    fn has_layouts(&self) -> bool {
        self.tera
            .get_template_names()
            .any(|n| n.starts_with("layouts/"))
    }
}

/// Parse layouts + partials into a fresh Tera set and load data files.
fn load(views: &ViewPaths) -> Result<(Tera, tera::Context)> {
    let mut tera = Tera::default();

    let mut files = Vec::new();
    for (dir, prefix) in [(views.layouts(), "layouts"), (views.partials(), "partials")] {
        for path in collect_files(&dir, is_html) {
            let name = template_name(&path, &dir, prefix);
            files.push((path, Some(name)));
        }
    }
    tera.add_template_files(files)
        .map_err(|e| anyhow!("template parse failed: {}", flatten_tera_error(&e)))?;

    // Escape variables in page bodies (rendered as one-off templates) the
    // same way layout/partial templates are escaped.
    tera.autoescape_on(vec![".html", ".htm", "__tera_one_off"]);

    helpers::register(&mut tera);

    let data = data::load(&views.data())?;
    Ok((tera, data))
}

/// `layouts/default.html`, `partials/nav/menu.html` - forward slashes on
/// every platform so template references are portable.
fn template_name(path: &Path, dir: &Path, prefix: &str) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    let mut name = String::from(prefix);
    for component in relative.components() {
        name.push('/');
        name.push_str(&component.as_os_str().to_string_lossy());
    }
    name
}

fn is_html(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "html" || e == "htm")
}

// ============================================================================
// Front matter
// ============================================================================

#[derive(Debug, Default)]
struct FrontMatter {
    layout: Option<String>,
    extra: Option<toml::value::Table>,
}

const FENCE: &str = "+++";

/// Split `+++` front matter fences off the page body.
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let rest = match source.strip_prefix(FENCE) {
        Some(rest) => rest,
        None => return (None, source),
    };
    // Fence must be a full line
    let rest = match rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) {
        Some(rest) => rest,
        None => return (None, source),
    };

    match rest.split_once(FENCE) {
        Some((front, body)) => (Some(front), body.trim_start_matches(['\r', '\n'])),
        None => (None, source),
    }
}

fn parse_front_matter(front: Option<&str>, page: &Path) -> Result<FrontMatter> {
    let Some(front) = front else {
        return Ok(FrontMatter::default());
    };

    let mut table: toml::value::Table = toml::from_str(front)
        .with_context(|| format!("{}: invalid front matter", page.display()))?;

    let layout = match table.remove("layout") {
        Some(toml::Value::String(s)) => Some(s),
        Some(other) => bail!(
            "{}: front matter 'layout' must be a string, got {}",
            page.display(),
            other.type_str()
        ),
        None => None,
    };

    Ok(FrontMatter {
        layout,
        extra: Some(table),
    })
}

// ============================================================================
// Error shaping
// ============================================================================

/// Tera nests the useful message in its source chain; flatten it.
fn flatten_tera_error(error: &tera::Error) -> String {
    use std::error::Error as _;
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn render_error(page: &Path, error: &tera::Error) -> anyhow::Error {
    anyhow!("{}: {}", page.display(), flatten_tera_error(error))
}

// ============================================================================
// Tests
// ============================================================================
