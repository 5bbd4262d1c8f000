//! Everything a render of the home page needs, fetched concurrently.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::{
    error::StoreError,
    model::{Issue, LanguageCount, OrgGroup, RepoGroup, Rows},
    pagination::Pagination,
    query,
    sanitize::{Params, View},
    store::{Backend, Select},
};

/// The data of one render of the home page.
#[derive(Clone, Debug)]
pub struct Listing {
    pub params: Params,
    /// Time of the request, anchoring relative dates and the trending window
    pub now: DateTime<Utc>,
    pub languages: Vec<LanguageCount>,
    pub open_issues: u64,
    pub issues: Rows<Issue>,
    pub repos: Rows<RepoGroup>,
    pub orgs: Rows<OrgGroup>,
}

impl Listing {
    /// Run the queries needed by `params`.
    ///
    /// Languages and the open issue count are always fetched. A search fetches the first page
    /// of every view; otherwise only the current view is fetched. Failed queries yield empty rows.
    pub async fn load<B: Backend>(backend: &B, params: Params, now: DateTime<Utc>) -> Self {
        let lists = async {
            if params.is_search() {
                let first_page = Params {
                    page: 1,
                    ..params.clone()
                };
                futures::join!(
                    fetch::<_, Issue>(backend, query::issues(&first_page, now), "issues"),
                    fetch::<_, RepoGroup>(backend, query::repos(&first_page), "repositories"),
                    fetch::<_, OrgGroup>(backend, query::orgs(&first_page), "organizations"),
                )
            } else {
                match params.view {
                    View::Issues => (
                        fetch::<_, Issue>(backend, query::issues(&params, now), "issues").await,
                        Rows::empty(),
                        Rows::empty(),
                    ),
                    View::Repos => (
                        Rows::empty(),
                        fetch::<_, RepoGroup>(backend, query::repos(&params), "repositories").await,
                        Rows::empty(),
                    ),
                    View::Orgs => (
                        Rows::empty(),
                        Rows::empty(),
                        fetch::<_, OrgGroup>(backend, query::orgs(&params), "organizations").await,
                    ),
                }
            }
        };
        let (languages, open_issues, (issues, repos, orgs)) = futures::join!(
            fetch::<_, LanguageCount>(backend, query::languages(), "languages"),
            fetch::<_, IgnoredAny>(backend, query::open_issue_count(), "open issue count"),
            lists,
        );
        Self {
            params,
            now,
            languages: languages.items,
            open_issues: open_issues.total,
            issues,
            repos,
            orgs,
        }
    }

    /// Total number of rows of the current view.
    pub fn total(&self) -> u64 {
        match self.params.view {
            View::Issues => self.issues.total,
            View::Repos => self.repos.total,
            View::Orgs => self.orgs.total,
        }
    }

    /// Total number of rows across the three views, for a search.
    pub fn combined_total(&self) -> u64 {
        self.issues.total + self.repos.total + self.orgs.total
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(
            self.params.page,
            self.total(),
            self.params.view.page_size(),
        )
    }
}

/// Run `select`, turning any failure into empty rows.
async fn fetch<B, T>(backend: &B, select: Select, what: &str) -> Rows<T>
where
    B: Backend,
    T: DeserializeOwned + Send,
{
    match backend.select(&select).await {
        Ok(rows) => rows,
        Err(StoreError::NotConfigured) => {
            log::debug!("Not fetching {what}: data store not configured");
            Rows::empty()
        }
        Err(err) => {
            log::error!("Error fetching {what}: {err}");
            Rows::empty()
        }
    }
}
