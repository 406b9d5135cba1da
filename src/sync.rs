use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::{
    archive::ArchiveWriter,
    error::Result,
    fetch::{fetch_all, IssueSource},
    render::{write_index, IndexOptions},
    settings::Settings,
};

/// Everything a run needs besides the issue source.
#[derive(Debug, Clone)]
pub struct SyncJob {
    pub root: PathBuf,
    pub archive_dir: String,
    pub wiki_dir: String,
    pub uncategorized: String,
    pub lenient_pagination: bool,
    pub index: IndexOptions,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub archived: usize,
    pub pull_requests: usize,
}

impl From<&Settings> for SyncJob {
    fn from(settings: &Settings) -> Self {
        Self {
            root: settings.output.root.clone(),
            archive_dir: settings.output.archive_dir.clone(),
            wiki_dir: settings.output.wiki_dir.clone(),
            uncategorized: settings.index.uncategorized.clone(),
            lenient_pagination: settings.lenient_pagination,
            index: IndexOptions {
                title: settings.index.title.clone(),
                site_title: settings.index.site_title.clone(),
                wiki_url: settings.wiki_url(),
                visible_entries: settings.index.visible_entries,
            },
        }
    }
}

impl SyncJob {
    pub async fn run<S>(&self, source: &S) -> Result<SyncReport>
    where
        S: IssueSource + ?Sized,
    {
        let mut writer = ArchiveWriter::new(
            &self.root,
            &self.archive_dir,
            &self.wiki_dir,
            &self.uncategorized,
        );
        writer.prepare()?;

        info!("fetching open issues");
        let fetched = fetch_all(source, self.lenient_pagination).await?;

        let mut archived = 0;
        for issue in &fetched.issues {
            match writer.write(issue) {
                Ok(Some(_)) => archived += 1,
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "archive is incomplete: {archived} of {} issues written before failure",
                        fetched.issues.len()
                    );
                    return Err(e);
                }
            }
        }

        let pull_requests = writer.skipped();
        let catalog = writer.finish();
        if catalog.is_empty() {
            warn!("no open issues to archive, writing an empty index");
        }
        write_index(
            &self.root,
            &catalog,
            fetched.last_update.as_deref(),
            &self.index,
        )?;

        Ok(SyncReport {
            fetched: fetched.issues.len(),
            archived,
            pull_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, fs, path::Path};

    use serde_json::{json, Value};
    use tempfile::TempDir;

    use super::*;
    use crate::fetch::tests::{issue_json, FakeSource};

    fn job(root: &Path) -> SyncJob {
        SyncJob {
            root: root.to_path_buf(),
            archive_dir: "BACKUP".to_string(),
            wiki_dir: "wiki_temp".to_string(),
            uncategorized: "Uncategorized".to_string(),
            lenient_pagination: false,
            index: IndexOptions {
                title: "Archive".to_string(),
                site_title: "Site".to_string(),
                wiki_url: "https://github.com/o/r/wiki".to_string(),
                visible_entries: 5,
            },
        }
    }

    fn two_issues() -> Value {
        json!([
            {
                "title": "A:B",
                "body": "first",
                "created_at": "2024-01-01T09:00:00Z",
                "updated_at": "2024-01-05T09:00:00Z",
                "labels": [{ "name": "Poetry" }],
            },
            {
                "title": "Plain Title",
                "body": null,
                "created_at": "2024-01-02T09:00:00Z",
                "updated_at": "2024-01-03T09:00:00Z",
                "labels": [],
            },
        ])
    }

    fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    let contents = fs::read(&path).unwrap();
                    files.insert(path.strip_prefix(root).unwrap().to_path_buf(), contents);
                }
            }
        }
        files
    }

    #[tokio::test]
    async fn archives_two_issues() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::new(vec![two_issues()]);

        let report = job(dir.path()).run(&source).await.unwrap();

        assert_eq!(
            report,
            SyncReport {
                fetched: 2,
                archived: 2,
                pull_requests: 0
            }
        );
        let root = dir.path();
        assert!(root.join("BACKUP/Poetry/2024-01-01-AB.md").is_file());
        assert!(root.join("BACKUP/Uncategorized/2024-01-02-Plain-Title.md").is_file());
        assert!(root.join("wiki_temp/[Poetry] 2024-01-01-AB.md").is_file());
        assert!(root
            .join("wiki_temp/[Uncategorized] 2024-01-02-Plain-Title.md")
            .is_file());

        let readme = fs::read_to_string(root.join("README.md")).unwrap();
        let poetry = readme.find("### 📁 Poetry (1)").unwrap();
        let uncategorized = readme.find("### 📁 Uncategorized (1)").unwrap();
        assert!(poetry < uncategorized);
        assert!(readme.contains("- [A:B](BACKUP/Poetry/2024-01-01-AB.md) — `2024-01-01`"));
        assert!(readme.contains(
            "- [Plain Title](BACKUP/Uncategorized/2024-01-02-Plain-Title.md) — `2024-01-02`"
        ));
        assert_eq!(readme.matches("](BACKUP/").count(), 2);
        assert!(readme.ends_with("*Last full update: 2024-01-05T09:00:00Z*"));

        let site = fs::read_to_string(root.join("index.md")).unwrap();
        assert_eq!(site, format!("---\nlayout: default\ntitle: Site\n---\n\n{readme}"));
        assert_eq!(fs::read(root.join(".nojekyll")).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn pull_requests_are_not_archived() {
        let dir = TempDir::new().unwrap();
        let mut page = two_issues();
        page.as_array_mut().unwrap().push(json!({
            "title": "Fix typo",
            "created_at": "2024-01-04T00:00:00Z",
            "updated_at": "2024-01-04T00:00:00Z",
            "labels": [{ "name": "Poetry" }],
            "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/3" },
        }));
        let source = FakeSource::new(vec![page]);

        let report = job(dir.path()).run(&source).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.archived, 2);
        assert_eq!(report.pull_requests, 1);
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.contains("There are **2** articles"));
        assert!(!readme.contains("Fix typo"));
        assert_eq!(fs::read_dir(dir.path().join("wiki_temp")).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn rerun_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let job = job(dir.path());

        job.run(&FakeSource::new(vec![two_issues()])).await.unwrap();
        let first = snapshot(dir.path());
        job.run(&FakeSource::new(vec![two_issues()])).await.unwrap();
        let second = snapshot(dir.path());

        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }

    #[tokio::test]
    async fn rerun_purges_vanished_issues() {
        let dir = TempDir::new().unwrap();
        let job = job(dir.path());

        job.run(&FakeSource::new(vec![two_issues()])).await.unwrap();
        job.run(&FakeSource::new(vec![json!([issue_json(
            7,
            "2024-02-01T00:00:00Z"
        )])]))
        .await
        .unwrap();

        assert!(!dir.path().join("BACKUP/Poetry").exists());
        assert!(dir
            .path()
            .join("BACKUP/Uncategorized/2024-01-01-Issue-7.md")
            .is_file());
    }

    #[tokio::test]
    async fn slashed_label_does_not_abort_the_run() {
        let dir = TempDir::new().unwrap();
        let mut page = two_issues();
        page.as_array_mut().unwrap().push(json!({
            "title": "Crash",
            "body": "stack trace",
            "created_at": "2024-01-02T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "labels": [{ "name": "type/bug" }],
        }));
        let source = FakeSource::new(vec![page]);

        let report = job(dir.path()).run(&source).await.unwrap();

        assert_eq!(report.archived, 3);
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.contains("### 📁 type/bug (1)"));
        assert!(readme.contains("(BACKUP/type-bug/2024-01-02-Crash.md)"));
        assert!(dir
            .path()
            .join("wiki_temp/[type-bug] 2024-01-02-Crash.md")
            .is_file());
    }

    #[tokio::test]
    async fn malformed_page_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let source = FakeSource::new(vec![json!({ "message": "Bad credentials" })]);

        let err = job(dir.path()).run(&source).await.unwrap_err();

        assert!(err.to_string().contains("Bad credentials"));
        assert!(!dir.path().join("README.md").exists());
    }
}
