//! HTML rendering of the home page.
//!
//! Every control is a plain link or a GET form, so the page works without scripts;
//! `/static/app.js` only adds autocompletion and the trending panel.

pub mod cards;
pub mod controls;

use crate::{
    format::thousands,
    href::Href,
    listing::Listing,
    sanitize::View,
    site::{DESCRIPTION, KEYWORDS, SITE_NAME, Site},
};

/// Cards shown in each section of a search.
const SEARCH_ISSUES: usize = 9;
const SEARCH_REPOS: usize = 8;
const SEARCH_ORGS: usize = 9;

/// Escape text for use in HTML content or in a quoted attribute.
pub fn esc(txt: &str) -> String {
    ammonia::clean_text(txt)
}

/// The full home page.
pub fn page(listing: &Listing, site: &Site) -> String {
    let params = &listing.params;
    let mut body = header(listing.open_issues);
    body += "<section class=\"controls\"><div class=\"container\">";
    body += &controls::search_box(params);
    body += &controls::view_toggle(params);
    body += &controls::language_filter(&listing.languages, params);
    body += "</div></section>";
    if params.has_filters() {
        body += &controls::active_filters(params);
    }
    body += "<main class=\"container\">";
    if params.is_search() {
        body += &search_results(listing);
    } else {
        body += &view_list(listing);
    }
    body += "</main>";
    layout(site, &body)
}

fn layout(site: &Site, body: &str) -> String {
    let title = esc(&site.title());
    let url = esc(&format!("{}/", site.url));
    let verification = site
        .google_verification
        .as_deref()
        .map(|token| {
            format!(
                "<meta name=\"google-site-verification\" content=\"{}\">",
                esc(token)
            )
        })
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n\
<meta name=\"description\" content=\"{description}\">\n\
<meta name=\"keywords\" content=\"{keywords}\">\n\
<meta name=\"application-name\" content=\"{name}\">\n\
<meta name=\"robots\" content=\"index, follow, max-image-preview:large, max-snippet:-1, max-video-preview:-1\">\n\
{verification}\n\
<link rel=\"canonical\" href=\"{url}\">\n\
<link rel=\"manifest\" href=\"/manifest.json\">\n\
<link rel=\"icon\" href=\"/static/favicon.svg\">\n\
<meta property=\"og:type\" content=\"website\">\n\
<meta property=\"og:url\" content=\"{url}\">\n\
<meta property=\"og:site_name\" content=\"{name}\">\n\
<meta property=\"og:title\" content=\"{title}\">\n\
<meta property=\"og:description\" content=\"{description}\">\n\
<meta property=\"og:locale\" content=\"en_US\">\n\
<meta name=\"twitter:card\" content=\"summary_large_image\">\n\
<meta name=\"twitter:title\" content=\"{title}\">\n\
<meta name=\"twitter:description\" content=\"{description}\">\n\
<link rel=\"stylesheet\" href=\"/static/style.css\">\n\
<script src=\"/static/app.js\" defer></script>\n\
</head>\n\
<body>\n\
<script type=\"application/ld+json\">{json_ld}</script>\n\
{body}\n\
</body>\n\
</html>\n",
        description = esc(DESCRIPTION),
        keywords = esc(&KEYWORDS.join(", ")),
        name = esc(SITE_NAME),
        json_ld = site.json_ld(),
    )
}

fn header(open_issues: u64) -> String {
    format!(
        "<header class=\"site-header\"><div class=\"container\">\
<a href=\"/\" class=\"brand\"><img src=\"/static/favicon.svg\" alt=\"{name}\" width=\"24\" height=\"24\"><span>{name}</span></a>\
<span class=\"total\"><strong>{total}</strong> issues</span>\
</div></header>",
        name = esc(SITE_NAME),
        total = thousands(open_issues),
    )
}

/// The three sections of a free-text search, each with a link to its full view.
fn search_results(listing: &Listing) -> String {
    let now = listing.now;
    let mut html = format!(
        "<div class=\"summary\"><strong>{}</strong> combined results</div>",
        thousands(listing.combined_total())
    );
    html += &search_section(
        listing,
        View::Issues,
        "Issues",
        listing.issues.total,
        "grid",
        listing
            .issues
            .items
            .iter()
            .take(SEARCH_ISSUES)
            .map(|issue| cards::issue_card(issue, now)),
    );
    html += &search_section(
        listing,
        View::Repos,
        "Repositories",
        listing.repos.total,
        "stack",
        listing
            .repos
            .items
            .iter()
            .take(SEARCH_REPOS)
            .map(cards::repo_card),
    );
    html += &search_section(
        listing,
        View::Orgs,
        "Organizations",
        listing.orgs.total,
        "grid",
        listing
            .orgs
            .items
            .iter()
            .take(SEARCH_ORGS)
            .map(cards::org_card),
    );
    html
}

fn search_section(
    listing: &Listing,
    view: View,
    title: &str,
    total: u64,
    layout: &str,
    cards: impl Iterator<Item = String>,
) -> String {
    let params = &listing.params;
    let view_all = Href::new()
        .with("view", view)
        .with_opt("q", params.q.as_deref())
        .with_opt("language", params.language.as_deref())
        .with_opt("org", params.org.as_deref());
    format!(
        "<section class=\"search-section\" id=\"{view}\">\
<div class=\"section-head\"><h2>{title}</h2><a href=\"{href}\">View all {total}</a></div>\
{content}</section>",
        href = esc(&view_all.to_string()),
        total = thousands(total),
        content = card_list(layout, cards),
    )
}

/// The list of the current view, with its sort links and pagination.
fn view_list(listing: &Listing) -> String {
    let params = &listing.params;
    let total = thousands(listing.total());
    let (summary, layout, cards, noun): (String, _, Vec<String>, _) = match params.view {
        View::Issues => (
            if params.has_filters() {
                format!("<strong>{total}</strong> results")
            } else {
                "Latest issues".into()
            },
            "grid",
            listing
                .issues
                .items
                .iter()
                .map(|issue| cards::issue_card(issue, listing.now))
                .collect(),
            "issues",
        ),
        View::Repos => (
            format!("<strong>{total}</strong> repositories"),
            "stack",
            listing.repos.items.iter().map(cards::repo_card).collect(),
            "repositories",
        ),
        View::Orgs => (
            format!("<strong>{total}</strong> organizations"),
            "grid",
            listing.orgs.items.iter().map(cards::org_card).collect(),
            "organizations",
        ),
    };
    let mut html = format!(
        "<div class=\"list-head\"><p class=\"summary\">{summary}</p>{}</div>",
        controls::sort_links(params)
    );
    html += &card_list(layout, cards.into_iter());
    let pagination = listing.pagination();
    if pagination.is_needed() {
        html += &controls::pagination(&pagination, params, noun);
    }
    html
}

/// Cards laid out as a grid or a stack, or the empty state when there is none.
fn card_list(layout: &str, cards: impl Iterator<Item = String>) -> String {
    let cards: String = cards.collect();
    if cards.is_empty() {
        controls::empty_state()
    } else {
        format!("<div class=\"{layout}\">{cards}</div>")
    }
}
