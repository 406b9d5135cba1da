use std::{fs, path::Path};

use itertools::Itertools;
use tracing::info;

use crate::{
    archive::{Catalog, LinkEntry},
    error::{Result, SyncError},
};

pub const README_FILE: &str = "README.md";
pub const SITE_FILE: &str = "index.md";
pub const NOJEKYLL_FILE: &str = ".nojekyll";

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub title: String,
    pub site_title: String,
    pub wiki_url: String,
    /// Entries shown per category before the rest is collapsed.
    pub visible_entries: usize,
}

/// Render the categorized index that becomes `README.md`.
pub fn render_index(catalog: &Catalog, last_update: Option<&str>, opts: &IndexOptions) -> String {
    let mut out = format!(
        "# {}\n\n> [📖 Read in the wiki]({})\n\nThere are **{}** articles archived by category:\n\n---\n\n",
        opts.title,
        opts.wiki_url,
        catalog.len()
    );

    for (category, entries) in catalog.iter() {
        out.push_str(&render_section(category, entries, opts.visible_entries));
    }

    out.push_str(&format!(
        "---\n*Last full update: {}*",
        last_update.unwrap_or("N/A")
    ));
    out
}

fn render_section(category: &str, entries: &[LinkEntry], visible: usize) -> String {
    let (shown, hidden) = entries.split_at(visible.min(entries.len()));

    let mut section = format!(
        "### 📁 {category} ({})\n{}\n",
        entries.len(),
        shown.iter().map(LinkEntry::as_str).join("\n")
    );
    if !hidden.is_empty() {
        section.push_str(&format!(
            "\n<details>\n<summary>Show {} more</summary>\n\n{}\n\n</details>\n",
            hidden.len(),
            hidden.iter().map(LinkEntry::as_str).join("\n")
        ));
    }
    section.push('\n');
    section
}

/// Wrap the index in the front matter a static site generator expects.
pub fn render_site_page(index: &str, site_title: &str) -> String {
    format!("---\nlayout: default\ntitle: {site_title}\n---\n\n{index}")
}

/// Write `README.md`, `index.md` and the `.nojekyll` marker under `root`.
pub fn write_index(
    root: &Path,
    catalog: &Catalog,
    last_update: Option<&str>,
    opts: &IndexOptions,
) -> Result<()> {
    let index = render_index(catalog, last_update, opts);

    let readme = root.join(README_FILE);
    fs::write(&readme, &index).map_err(SyncError::io(&readme))?;

    let site = root.join(SITE_FILE);
    fs::write(&site, render_site_page(&index, &opts.site_title)).map_err(SyncError::io(&site))?;

    let marker = root.join(NOJEKYLL_FILE);
    fs::write(&marker, b"").map_err(SyncError::io(&marker))?;

    info!("wrote {} and {}", readme.display(), site.display());
    Ok(())
}
