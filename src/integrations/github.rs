use std::time::Duration;

use async_trait::async_trait;
use octocrab::{service::middleware::retry::RetryConfig, Octocrab};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    error::{Result, SyncError},
    fetch::IssueSource,
};

/// Minimal GitHub config used by the issue listing.
#[derive(Clone, Debug)]
pub struct GhCfg {
    pub repo: String,          // "owner/repo"
    pub token: Option<String>, // PAT / App token
    pub api_url: Option<String>,
    pub timeout: Duration,
}

#[derive(Serialize)]
struct ListParams {
    state: &'static str,
    per_page: u8,
    page: u32,
}

/// Open issues of one repository, read through octocrab.
pub struct GithubIssues {
    octo: Octocrab,
    route: String,
}

impl GithubIssues {
    pub fn new(cfg: &GhCfg) -> Result<Self> {
        let (owner, repo) = cfg
            .repo
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
            .ok_or_else(|| SyncError::InvalidRepo(cfg.repo.clone()))?;

        // A failed page fails the run; rerunning is the retry.
        let mut builder = Octocrab::builder()
            .add_retry_config(RetryConfig::None)
            .set_connect_timeout(Some(cfg.timeout))
            .set_read_timeout(Some(cfg.timeout));

        match cfg.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => builder = builder.personal_token(token.to_string()),
            None => warn!("no GitHub token configured, using anonymous access"),
        }
        if let Some(url) = &cfg.api_url {
            builder = builder.base_uri(url.as_str())?;
        }

        Ok(Self {
            octo: builder.build()?,
            route: format!("/repos/{owner}/{repo}/issues"),
        })
    }
}

#[async_trait]
impl IssueSource for GithubIssues {
    async fn fetch_page(&self, page: u32, per_page: u8) -> Result<Value> {
        debug!("GET {} page {page}", self.route);
        let params = ListParams {
            state: "open",
            per_page,
            page,
        };
        let body: Value = self.octo.get(&self.route, Some(&params)).await?;
        Ok(body)
    }
}
