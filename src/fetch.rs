use async_trait::async_trait;
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, SyncError},
    models::Issue,
};

/// Page size requested from the issues listing. A shorter page is the last one.
pub const PER_PAGE: u8 = 100;

/// One page of the open-issue listing, as raw JSON.
///
/// The body is returned undecoded so callers can tell an error payload apart
/// from an issue list.
#[async_trait]
pub trait IssueSource {
    async fn fetch_page(&self, page: u32, per_page: u8) -> Result<Value>;
}

#[derive(Debug, Default)]
pub struct Fetched {
    pub issues: Vec<Issue>,
    /// `updated_at` of the most recently updated issue, pull requests included.
    pub last_update: Option<String>,
}

pub async fn fetch_all<S>(source: &S, lenient: bool) -> Result<Fetched>
where
    S: IssueSource + ?Sized,
{
    let mut issues = Vec::new();
    let mut page = 1;

    loop {
        let body = source.fetch_page(page, PER_PAGE).await?;

        let items = match body {
            Value::Array(items) => items,
            other => {
                let detail = error_detail(&other);
                if lenient {
                    warn!("page {page} is not an issue list ({detail}), stopping early");
                    break;
                }
                return Err(SyncError::MalformedPage { page, detail });
            }
        };

        let count = items.len();
        debug!("page {page}: {count} issues");
        if count == 0 {
            break;
        }

        let decoded: Vec<Issue> = serde_json::from_value(Value::Array(items))
            .map_err(|source| SyncError::Decode { page, source })?;
        issues.extend(decoded);

        if count < usize::from(PER_PAGE) {
            break;
        }
        page += 1;
    }

    info!("fetched {} open issues over {page} page(s)", issues.len());

    let last_update = latest_update(&issues);
    Ok(Fetched {
        issues,
        last_update,
    })
}

fn latest_update(issues: &[Issue]) -> Option<String> {
    issues
        .iter()
        .max_by_key(|issue| OffsetDateTime::parse(&issue.updated_at, &Rfc3339).ok())
        .map(|issue| issue.updated_at.clone())
}

fn error_detail(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
