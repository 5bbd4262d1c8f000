//! Translate sanitized page parameters into data store queries, one per view.
//!
//! Ranking is left to the data store: all we pick is the column and direction of the ordering.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    sanitize::{Params, SortKey, View},
    store::{Filter, Order, Select},
};

pub const ISSUES: &str = "issues";
pub const REPO_STATS: &str = "repo_stats";
pub const ORG_STATS: &str = "org_stats";
pub const LANGUAGE_STATS: &str = "language_stats";

/// Number of languages offered in the language filter.
pub const LANGUAGE_LIMIT: u64 = 20;

/// Offset of the first row of `page` (1-based).
fn offset(page: u32, page_size: u64) -> u64 {
    u64::from(page.max(1) - 1) * page_size
}

fn timestamp(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Open issues, filtered by search text, language and organization.
///
/// `now` anchors the trending window.
pub fn issues(params: &Params, now: DateTime<Utc>) -> Select {
    let page_size = View::Issues.page_size();
    let mut select = Select::new(ISSUES).exact_count().eq("is_open", true);
    if let Some(q) = &params.q {
        select = select.filter(Filter::Or(vec![
            Filter::contains("title", q),
            Filter::contains("repo_full_name", q),
        ]));
    }
    if let Some(language) = &params.language {
        select = select.eq("language", language);
    }
    if let Some(org) = &params.org {
        select = select.eq("repo_owner", org);
    }

    select = match params.sort {
        Some(SortKey::Stars) => select.order(Order::desc("stars").nulls_last()),
        Some(SortKey::Trending) => {
            let (oldest, newest) = params.trending.bounds(now);
            select
                .gte("created_at", timestamp(oldest))
                .lte("created_at", timestamp(newest))
                .gte("stars", params.trending.min_stars())
                .order(Order::desc("created_at"))
                .order(Order::desc("stars").nulls_last())
        }
        Some(SortKey::Oldest) => select.order(Order::asc("created_at")),
        _ => select.order(Order::desc("created_at")),
    };
    select.range(offset(params.page, page_size), page_size)
}

/// Repositories with open issues, filtered by search text and language.
pub fn repos(params: &Params) -> Select {
    let page_size = View::Repos.page_size();
    let mut select = Select::new(REPO_STATS).exact_count();
    if let Some(q) = &params.q {
        select = select.filter(Filter::Or(vec![
            Filter::contains("repo_full_name", q),
            Filter::contains("repo_owner", q),
        ]));
    }
    if let Some(language) = &params.language {
        select = select.eq("language", language);
    }
    let order = match params.sort {
        Some(SortKey::Stars) => Order::desc("stars"),
        Some(SortKey::Name) => Order::asc("repo_full_name"),
        _ => Order::desc("issue_count"),
    };
    select
        .order(order.nulls_last())
        .range(offset(params.page, page_size), page_size)
}

/// Organizations with open issues, filtered by search text.
///
/// The aggregate view has no per-language breakdown, so the language filter does not apply.
pub fn orgs(params: &Params) -> Select {
    let page_size = View::Orgs.page_size();
    let mut select = Select::new(ORG_STATS).exact_count();
    if let Some(q) = &params.q {
        select = select.filter(Filter::contains("org_name", q));
    }
    let order = match params.sort {
        Some(SortKey::Stars) => Order::desc("max_stars"),
        Some(SortKey::Repos) => Order::desc("repo_count"),
        Some(SortKey::Name) => Order::asc("org_name"),
        _ => Order::desc("issue_count"),
    };
    select
        .order(order.nulls_last())
        .range(offset(params.page, page_size), page_size)
}

/// Languages having the most open issues.
pub fn languages() -> Select {
    Select::new(LANGUAGE_STATS)
        .columns("language,issue_count")
        .order(Order::desc("issue_count"))
        .limit(LANGUAGE_LIMIT)
}

/// Number of open issues, without any row.
pub fn open_issue_count() -> Select {
    Select::new(ISSUES).eq("is_open", true).head()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{store::Filter::*, trending::TrendingWindow};
    use chrono::TimeZone;
    use test_case::test_case;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 8, 0, 0).unwrap()
    }

    fn sorted(view: View, sort: Option<SortKey>) -> Params {
        Params {
            view,
            sort,
            ..Params::default()
        }
    }

    fn order_of(select: &Select) -> Vec<(&'static str, bool)> {
        select
            .orders()
            .iter()
            .map(|o| (o.column, o.ascending))
            .collect()
    }

    #[test_case(None => vec![("created_at", false)])]
    #[test_case(Some(SortKey::Newest) => vec![("created_at", false)])]
    #[test_case(Some(SortKey::Oldest) => vec![("created_at", true)])]
    #[test_case(Some(SortKey::Stars) => vec![("stars", false)])]
    #[test_case(Some(SortKey::Trending) => vec![("created_at", false), ("stars", false)])]
    #[test_case(Some(SortKey::Name) => vec![("created_at", false)]; "name is meaningless for issues")]
    fn issue_order(sort: Option<SortKey>) -> Vec<(&'static str, bool)> {
        order_of(&issues(&sorted(View::Issues, sort), now()))
    }

    #[test_case(None => vec![("issue_count", false)])]
    #[test_case(Some(SortKey::Issues) => vec![("issue_count", false)])]
    #[test_case(Some(SortKey::Stars) => vec![("stars", false)])]
    #[test_case(Some(SortKey::Name) => vec![("repo_full_name", true)])]
    #[test_case(Some(SortKey::Repos) => vec![("issue_count", false)])]
    fn repo_order(sort: Option<SortKey>) -> Vec<(&'static str, bool)> {
        order_of(&repos(&sorted(View::Repos, sort)))
    }

    #[test_case(None => vec![("issue_count", false)])]
    #[test_case(Some(SortKey::Issues) => vec![("issue_count", false)])]
    #[test_case(Some(SortKey::Stars) => vec![("max_stars", false)])]
    #[test_case(Some(SortKey::Repos) => vec![("repo_count", false)])]
    #[test_case(Some(SortKey::Name) => vec![("org_name", true)])]
    #[test_case(Some(SortKey::Newest) => vec![("issue_count", false)])]
    fn org_order(sort: Option<SortKey>) -> Vec<(&'static str, bool)> {
        order_of(&orgs(&sorted(View::Orgs, sort)))
    }

    #[test]
    fn aggregate_orders_put_nulls_last() {
        for select in [
            repos(&sorted(View::Repos, Some(SortKey::Stars))),
            orgs(&sorted(View::Orgs, Some(SortKey::Stars))),
        ] {
            assert!(select.orders().iter().all(|o| o.nulls_last));
        }
    }

    #[test_case(View::Issues, 1 => (0, 24))]
    #[test_case(View::Issues, 3 => (48, 24))]
    #[test_case(View::Repos, 2 => (30, 30))]
    #[test_case(View::Orgs, 1000 => (29970, 30))]
    fn page_range(view: View, page: u32) -> (u64, u64) {
        let params = Params {
            view,
            page,
            ..Params::default()
        };
        let select = match view {
            View::Issues => issues(&params, now()),
            View::Repos => repos(&params),
            View::Orgs => orgs(&params),
        };
        (select.offset().unwrap(), select.row_limit().unwrap())
    }

    #[test]
    fn issue_filters() {
        let params = Params {
            q: Some("async".into()),
            language: Some("Rust".into()),
            org: Some("tokio-rs".into()),
            ..Params::default()
        };
        let select = issues(&params, now());
        assert_eq!(select.table_name(), ISSUES);
        assert!(select.wants_count());
        assert_eq!(
            select.filters(),
            &[
                Eq("is_open", "true".into()),
                Or(vec![
                    Ilike("title", "*async*".into()),
                    Ilike("repo_full_name", "*async*".into()),
                ]),
                Eq("language", "Rust".into()),
                Eq("repo_owner", "tokio-rs".into()),
            ]
        );
    }

    #[test]
    fn trending_filters() {
        let params = Params {
            sort: Some(SortKey::Trending),
            trending: TrendingWindow::new(7, 1, 500),
            ..Params::default()
        };
        let select = issues(&params, now());
        assert_eq!(
            &select.filters()[1..],
            &[
                Gte("created_at", "2025-06-23T08:00:00.000Z".into()),
                Lte("created_at", "2025-06-29T08:00:00.000Z".into()),
                Gte("stars", "500".into()),
            ]
        );
    }

    #[test]
    fn trending_window_ignored_for_other_sorts() {
        let params = Params {
            sort: Some(SortKey::Stars),
            trending: TrendingWindow::new(7, 1, 500),
            ..Params::default()
        };
        assert_eq!(issues(&params, now()).filters().len(), 1);
    }

    #[test]
    fn repo_filters() {
        let params = Params {
            view: View::Repos,
            q: Some("serde".into()),
            language: Some("Rust".into()),
            ..Params::default()
        };
        assert_eq!(
            repos(&params).filters(),
            &[
                Or(vec![
                    Ilike("repo_full_name", "*serde*".into()),
                    Ilike("repo_owner", "*serde*".into()),
                ]),
                Eq("language", "Rust".into()),
            ]
        );
    }

    #[test]
    fn org_ignores_language() {
        let params = Params {
            view: View::Orgs,
            q: Some("rust".into()),
            language: Some("Rust".into()),
            ..Params::default()
        };
        assert_eq!(
            orgs(&params).filters(),
            &[Ilike("org_name", "*rust*".into())]
        );
    }

    #[test]
    fn language_and_count_queries() {
        let select = languages();
        assert_eq!(select.table_name(), LANGUAGE_STATS);
        assert_eq!(select.row_limit(), Some(LANGUAGE_LIMIT));
        assert!(!select.wants_count());
        let select = open_issue_count();
        assert!(select.is_head());
        assert_eq!(select.filters(), &[Eq("is_open", "true".into())]);
    }
}
