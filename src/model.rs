//! I define the rows read from the data store.
//!
//! All of them are read-only projections: rows are created, aggregated and deleted
//! by the ingestion side, never by this crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A beginner-friendly issue (row of `issues`)
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Issue {
    pub id: u64,
    /// `owner/name` of the repository
    pub repo_full_name: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub issue_number: u64,
    pub title: String,
    /// Link to the issue on GitHub
    pub url: String,
    pub author: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub is_open: bool,
}

/// All open issues of one repository (row of `repo_stats`)
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RepoGroup {
    pub repo_full_name: String,
    pub repo_owner: String,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub issue_count: u64,
}

/// All open issues of one organization (row of `org_stats`)
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct OrgGroup {
    pub org_name: String,
    pub repo_count: u64,
    pub issue_count: u64,
    /// The most represented language among the repositories of this organization
    pub top_language: Option<String>,
    /// Stars of the most starred repository of this organization
    pub max_stars: Option<u64>,
}

/// Number of open issues per language (row of `language_stats`)
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LanguageCount {
    pub language: String,
    pub issue_count: u64,
}

/// One autocomplete entry, as returned by the `search_suggestions` database function
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    /// Text displayed to the user
    pub label: String,
    /// Value put in the search box when the suggestion is picked
    pub value: String,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Issue,
    Repo,
    Org,
    Language,
}

/// A page of rows, together with the total number of rows matching the query.
#[derive(Clone, Debug, PartialEq)]
pub struct Rows<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Rows<T> {
    pub fn empty() -> Self {
        Self {
            items: vec![],
            total: 0,
        }
    }
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self::empty()
    }
}
