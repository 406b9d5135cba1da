use serde_derive::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
}

/// Open issue as returned by the GitHub issues listing.
///
/// Only the fields the archive needs are decoded, everything else in the
/// payload is ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct Issue {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    /// GitHub lists pull requests as issues; they carry a `pull_request` object.
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn category<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.labels
            .first()
            .map(|label| label.name.as_str())
            .unwrap_or(fallback)
    }

    /// Date portion of the creation timestamp, e.g. `2024-01-01`.
    pub fn creation_date(&self) -> &str {
        self.created_at
            .split_once('T')
            .map_or(self.created_at.as_str(), |(date, _)| date)
    }
}
