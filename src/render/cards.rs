use chrono::{DateTime, Utc};

use crate::{
    format::{compact, label_class, language_class, thousands, time_ago},
    href::Href,
    model::{Issue, OrgGroup, RepoGroup},
};

use super::esc;

/// Labels shown on an issue card; the others are summed up as `+N`.
const SHOWN_LABELS: usize = 3;

pub fn issue_card(issue: &Issue, now: DateTime<Utc>) -> String {
    let mut labels: String = issue
        .labels
        .iter()
        .take(SHOWN_LABELS)
        .map(|label| {
            format!(
                "<span class=\"label {}\">{}</span>",
                label_class(label),
                esc(label)
            )
        })
        .collect();
    if issue.labels.len() > SHOWN_LABELS {
        labels += &format!(
            "<span class=\"label label-more\">+{}</span>",
            issue.labels.len() - SHOWN_LABELS
        );
    }
    let stars = issue
        .stars
        .map(|stars| format!("<span class=\"stars\">★ {}</span>", compact(stars, 1)))
        .unwrap_or_default();
    format!(
        "<a class=\"card issue-card\" href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">\
<div class=\"meta\">{language}{stars}<time datetime=\"{created}\">{ago}</time></div>\
<div class=\"repo\">{repo} #{number}</div>\
<h3>{title}</h3>\
<div class=\"labels\">{labels}</div>\
</a>",
        url = esc(&issue.url),
        language = language_badge(issue.language.as_deref()),
        created = issue.created_at.to_rfc3339(),
        ago = time_ago(issue.created_at, now),
        repo = esc(&issue.repo_full_name),
        number = issue.issue_number,
        title = esc(&issue.title),
    )
}

/// A repository links to a search of its own issues.
pub fn repo_card(repo: &RepoGroup) -> String {
    let name = repo
        .repo_full_name
        .split_once('/')
        .map_or(repo.repo_full_name.as_str(), |(_, name)| name);
    let href = Href::new().with("org", &repo.repo_owner).with("q", name);
    let stars = repo
        .stars
        .map(|stars| format!("<span class=\"stars\">★ {}</span>", compact(stars, 1)))
        .unwrap_or_default();
    format!(
        "<a class=\"card repo-card\" href=\"{href}\">\
<div class=\"repo\"><span class=\"owner\">{owner}/</span><strong>{name}</strong></div>\
<div class=\"meta\">{language}{stars}<span class=\"count\">{issues} issues</span></div>\
</a>",
        href = esc(&href.to_string()),
        owner = esc(&repo.repo_owner),
        name = esc(name),
        language = language_badge(repo.language.as_deref()),
        issues = thousands(repo.issue_count),
    )
}

/// An organization links to the issue list filtered on it.
pub fn org_card(org: &OrgGroup) -> String {
    let href = Href::new().with("org", &org.org_name);
    let initial: String = org
        .org_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    let stars = match org.max_stars {
        Some(stars) if stars > 0 => {
            format!("<span class=\"stars\">★ {}</span>", compact(stars, 0))
        }
        _ => String::new(),
    };
    format!(
        "<a class=\"card org-card\" href=\"{href}\">\
<div class=\"avatar\">{initial}</div>\
<div class=\"body\"><strong>{name}</strong>\
<div class=\"meta\"><span>{repos} repos</span>{language}</div>\
<div class=\"meta\"><span class=\"count\">{issues} issues</span>{stars}</div></div>\
</a>",
        href = esc(&href.to_string()),
        initial = esc(&initial),
        name = esc(&org.org_name),
        repos = thousands(org.repo_count),
        language = language_badge(org.top_language.as_deref()),
        issues = thousands(org.issue_count),
    )
}

fn language_badge(language: Option<&str>) -> String {
    match language {
        Some(language) => format!(
            "<span class=\"language\"><span class=\"dot {}\"></span>{}</span>",
            language_class(language),
            esc(language)
        ),
        None => String::new(),
    }
}
