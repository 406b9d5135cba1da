use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    error::{Result, SyncError},
    models::Issue,
    utils::{encode_path, path_segment, sanitize_title},
};

/// Where one issue ends up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    pub category: String,
    /// `category` as used in file and directory names.
    pub category_dir: String,
    pub date: String,
    pub slug: String,
    pub archive_path: PathBuf,
    pub wiki_path: PathBuf,
}

/// A rendered Markdown list item pointing at an archived issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry(pub String);

impl LinkEntry {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Link entries grouped by category. Iterates in category name order.
#[derive(Debug, Default)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<LinkEntry>>,
}

impl Catalog {
    pub fn push(&mut self, category: &str, entry: LinkEntry) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(entry);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LinkEntry])> {
        self.categories
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Remove `dir` and everything under it, then create it again empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => debug!("removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(SyncError::io(dir)(e)),
    }
    fs::create_dir_all(dir).map_err(SyncError::io(dir))
}

pub struct ArchiveWriter {
    root: PathBuf,
    archive_dir: String,
    wiki_dir: String,
    uncategorized: String,
    catalog: Catalog,
    skipped: usize,
}

impl ArchiveWriter {
    pub fn new(root: &Path, archive_dir: &str, wiki_dir: &str, uncategorized: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            archive_dir: archive_dir.to_string(),
            wiki_dir: wiki_dir.to_string(),
            uncategorized: uncategorized.to_string(),
            catalog: Catalog::default(),
            skipped: 0,
        }
    }

    /// Wipe both output trees. Called once before the first `write`.
    pub fn prepare(&self) -> Result<()> {
        reset_dir(&self.root.join(&self.archive_dir))?;
        reset_dir(&self.root.join(&self.wiki_dir))
    }

    pub fn record_for(&self, issue: &Issue) -> ArchiveRecord {
        let category = issue.category(&self.uncategorized).to_string();
        let category_dir = path_segment(&category);
        let date = issue.creation_date().to_string();
        let slug = sanitize_title(&issue.title);
        let file_name = format!("{date}-{slug}.md");

        ArchiveRecord {
            archive_path: self
                .root
                .join(&self.archive_dir)
                .join(&category_dir)
                .join(&file_name),
            wiki_path: self
                .root
                .join(&self.wiki_dir)
                .join(format!("[{category_dir}] {file_name}")),
            category,
            category_dir,
            date,
            slug,
        }
    }

    /// Write both copies of `issue` and record its link. Pull requests are
    /// skipped and `None` is returned.
    pub fn write(&mut self, issue: &Issue) -> Result<Option<ArchiveRecord>> {
        if issue.is_pull_request() {
            self.skipped += 1;
            return Ok(None);
        }

        let record = self.record_for(issue);
        let body = issue.body_text();

        if let Some(dir) = record.archive_path.parent() {
            fs::create_dir_all(dir).map_err(SyncError::io(dir))?;
        }
        let archived = format!("# {}\n\n{body}", issue.title);
        fs::write(&record.archive_path, archived).map_err(SyncError::io(&record.archive_path))?;

        let wiki = format!(
            "# {}\n\n> Category: {} | Date: {}\n\n---\n\n{body}",
            issue.title, record.category, record.date
        );
        fs::write(&record.wiki_path, wiki).map_err(SyncError::io(&record.wiki_path))?;

        let link = format!(
            "{}/{}/{}-{}.md",
            self.archive_dir, record.category_dir, record.date, record.slug
        );
        let entry = LinkEntry(format!(
            "- [{}]({}) — `{}`",
            issue.title,
            encode_path(&link),
            record.date
        ));
        self.catalog.push(&record.category, entry);

        debug!("archived {}", record.archive_path.display());
        Ok(Some(record))
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> Catalog {
        info!(
            "archived {} issues in {} categories, skipped {} pull requests",
            self.catalog.len(),
            self.catalog.categories.len(),
            self.skipped
        );
        self.catalog
    }
}
