use std::{env, path::PathBuf};

use config::{Config, ConfigError, Environment, File};
use glob::glob;
use serde_derive::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Github {
    /// Repository to archive, `owner/repo`.
    pub repo: String,
    pub token: Option<String>,
    /// API root for GitHub Enterprise hosts.
    pub api_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    pub root: PathBuf,
    pub archive_dir: String,
    pub wiki_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Index {
    pub title: String,
    pub site_title: String,
    pub wiki_url: Option<String>,
    pub uncategorized: String,
    pub visible_entries: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub github: Github,
    pub output: Output,
    pub index: Index,
    pub lenient_pagination: bool,
}

/// Values given on the command line, applied after every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub lenient: bool,
}

impl Settings {
    pub fn new(overrides: Overrides) -> Result<Self, ConfigError> {
        let cwd = match env::current_dir() {
            Ok(cwd) => cwd.display().to_string(),
            Err(_) => ".".to_string(),
        };

        debug!(
            "Looking for configuration file {cwd}/config and/or configuration files in {cwd}{}",
            "/config/"
        );

        let pattern = format!("{cwd}/config/*");
        let config_dir = glob(&pattern)
            .map_err(|e| ConfigError::Message(format!("bad config pattern {pattern}: {e}")))?
            .filter_map(Result::ok)
            .map(File::from)
            .collect::<Vec<_>>();

        let mut builder = Config::builder()
            .set_default("github.timeout_secs", 30)?
            .set_default("output.root", ".")?
            .set_default("output.archive_dir", "BACKUP")?
            .set_default("output.wiki_dir", "wiki_temp")?
            .set_default("index.title", "Issue Archive")?
            .set_default("index.site_title", "Issue Archive")?
            .set_default("index.uncategorized", "Uncategorized")?
            .set_default("index.visible_entries", 5)?
            .set_default("lenient_pagination", false)?
            .add_source(File::with_name(&format!("{cwd}/config")).required(false))
            .add_source(config_dir);

        if let Some(path) = &overrides.config {
            debug!("Loading configuration file {}", path.display());
            builder = builder.add_source(File::from(path.as_path()));
        }

        let config = builder
            .add_source(Environment::with_prefix("ISSUE_ARCHIVE").separator("__"))
            .set_override_option("github.repo", overrides.repo)?
            .set_override_option("github.token", overrides.token)?
            .set_override_option(
                "output.root",
                overrides.output_dir.map(|p| p.display().to_string()),
            )?
            .set_override_option("lenient_pagination", overrides.lenient.then_some(true))?
            .build()?;

        config.try_deserialize()
    }

    pub fn wiki_url(&self) -> String {
        self.index
            .wiki_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}/wiki", self.github.repo))
    }
}
