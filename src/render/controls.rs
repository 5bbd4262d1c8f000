//! Search box, filters, sort links, trending panel and pagination.

use crate::{
    format::thousands,
    href::Href,
    model::LanguageCount,
    pagination::Pagination,
    sanitize::{Params, SortKey, View},
    trending::{STAR_PRESETS, TrendingWindow, WINDOW_PRESETS, stars_label},
};

use super::esc;

/// Languages offered in the language filter.
const LANGUAGE_BUTTONS: usize = 12;

/// The search form. Submitting keeps every other parameter but the page.
pub fn search_box(params: &Params) -> String {
    let kept = Params {
        q: None,
        page: 1,
        ..params.clone()
    }
    .href();
    let hidden: String = kept
        .pairs()
        .map(|(key, value)| {
            format!(
                "<input type=\"hidden\" name=\"{key}\" value=\"{}\">",
                esc(value)
            )
        })
        .collect();
    let clear = if params.q.is_some() {
        format!(
            "<a class=\"clear-search\" href=\"{}\" aria-label=\"Clear search\">×</a>",
            esc(&kept.to_string())
        )
    } else {
        String::new()
    };
    format!(
        "<form class=\"search\" action=\"/\" method=\"get\" role=\"search\" data-autocomplete>\
{hidden}\
<input type=\"search\" name=\"q\" value=\"{q}\" placeholder=\"Search issues, repos, or organizations...\" autocomplete=\"off\" aria-label=\"Search\">\
{clear}\
<ul class=\"suggestions\" role=\"listbox\" hidden></ul>\
</form>",
        q = esc(params.q.as_deref().unwrap_or_default()),
    )
}

/// Links to the three views. Switching view resets the page and the sort.
pub fn view_toggle(params: &Params) -> String {
    let links: String = [
        (View::Issues, "📋", "Issues"),
        (View::Repos, "📂", "Repos"),
        (View::Orgs, "🏢", "Orgs"),
    ]
    .into_iter()
    .map(|(view, icon, label)| {
        let href = Params {
            view,
            page: 1,
            sort: None,
            ..params.clone()
        }
        .href();
        format!(
            "<a class=\"{class}\" href=\"{href}\"><span>{icon}</span><span>{label}</span></a>",
            class = active_class("view-link", view == params.view),
            href = esc(&href.to_string()),
        )
    })
    .collect();
    format!("<nav class=\"view-toggle\">{links}</nav>")
}

/// One button per language; clicking the selected language removes the filter.
pub fn language_filter(languages: &[LanguageCount], params: &Params) -> String {
    let buttons: String = languages
        .iter()
        .take(LANGUAGE_BUTTONS)
        .map(|lang| {
            let selected = params.language.as_deref() == Some(lang.language.as_str());
            let href = Params {
                language: (!selected).then(|| lang.language.clone()),
                page: 1,
                ..params.clone()
            }
            .href();
            format!(
                "<a class=\"{class}\" href=\"{href}\" title=\"{count} issues\">{name}</a>",
                class = active_class("language", selected),
                href = esc(&href.to_string()),
                count = thousands(lang.issue_count),
                name = esc(&lang.language),
            )
        })
        .collect();
    format!("<div class=\"language-filter\">{buttons}</div>")
}

/// Badges of the active filters, each removing itself, and a link clearing them all.
pub fn active_filters(params: &Params) -> String {
    let mut badges = String::new();
    if let Some(q) = &params.q {
        let without = Params {
            q: None,
            page: 1,
            ..params.clone()
        };
        badges += &badge(&format!("\"{q}\""), &without.href());
    }
    if let Some(language) = &params.language {
        let without = Params {
            language: None,
            page: 1,
            ..params.clone()
        };
        badges += &badge(language, &without.href());
    }
    if let Some(org) = &params.org {
        let without = Params {
            org: None,
            page: 1,
            ..params.clone()
        };
        badges += &badge(org, &without.href());
    }
    let clear_all = Href::new().with("view", params.view);
    format!(
        "<div class=\"filters\"><div class=\"container\"><span class=\"muted\">Filters:</span>{badges}\
<a class=\"clear\" href=\"{}\">Clear all</a></div></div>",
        esc(&clear_all.to_string())
    )
}

fn badge(label: &str, remove: &Href) -> String {
    format!(
        "<span class=\"badge\">{}<a href=\"{}\" aria-label=\"Remove filter\">×</a></span>",
        esc(label),
        esc(&remove.to_string())
    )
}

/// Sort options of the current view; the issue view also gets the trending dropdown.
pub fn sort_links(params: &Params) -> String {
    use SortKey::*;
    let options: &[(SortKey, &str)] = match params.view {
        View::Issues => &[(Newest, "Newest"), (Stars, "Stars")],
        View::Repos => &[(Issues, "Issues"), (Stars, "Stars"), (Name, "Name")],
        View::Orgs => &[(Issues, "Issues"), (Repos, "Repos"), (Stars, "Stars")],
    };
    let current = params.effective_sort();
    let mut links: String = options
        .iter()
        .map(|(key, label)| {
            let href = Params {
                sort: Some(*key),
                page: 1,
                ..params.clone()
            }
            .href();
            format!(
                "<a class=\"{class}\" href=\"{href}\">{label}</a>",
                class = active_class("sort", *key == current),
                href = esc(&href.to_string()),
            )
        })
        .collect();
    if params.view == View::Issues {
        links += &trending_dropdown(params);
    }
    format!("<div class=\"sort-links\">{links}</div>")
}

/// The trending control.
///
/// While trending is not the current sort, this is a link to the default window.
/// Otherwise it shows the current window and opens a panel to change it.
pub fn trending_dropdown(params: &Params) -> String {
    if params.sort != Some(SortKey::Trending) {
        let href = Params {
            sort: Some(SortKey::Trending),
            trending: TrendingWindow::default(),
            page: 1,
            ..params.clone()
        }
        .href();
        return format!(
            "<div class=\"trending\"><a class=\"sort\" href=\"{}\">Trending</a></div>",
            esc(&href.to_string())
        );
    }

    let window = params.trending;
    let kept = Params {
        sort: None,
        page: 1,
        ..params.clone()
    }
    .href();
    let hidden: String = kept
        .pairs()
        .map(|(key, value)| {
            format!(
                "<input type=\"hidden\" name=\"{key}\" value=\"{}\">",
                esc(value)
            )
        })
        .collect();
    let star_presets: String = STAR_PRESETS
        .iter()
        .map(|stars| {
            format!(
                "<button type=\"button\" class=\"{}\" data-stars=\"{stars}\">{}</button>",
                active_class("preset", *stars == window.min_stars()),
                stars_label(*stars),
            )
        })
        .collect();
    let window_presets: String = WINDOW_PRESETS
        .iter()
        .map(|(label, from, to)| {
            format!(
                "<button type=\"button\" class=\"{}\" data-from=\"{from}\" data-to=\"{to}\">{label}</button>",
                active_class(
                    "preset",
                    *from == window.from_days() && *to == window.to_days()
                ),
            )
        })
        .collect();
    let to_label = if window.to_days() == 0 {
        "Today".to_string()
    } else {
        format!("{}d ago", window.to_days())
    };

    format!(
        "<div class=\"trending\" data-trending>\
<button type=\"button\" class=\"sort active\" aria-expanded=\"false\" data-trending-toggle>\
<span>Trending</span><span class=\"trending-label\">{label}</span></button>\
<form class=\"trending-panel\" action=\"/\" method=\"get\" hidden \
data-from=\"{from}\" data-to=\"{to}\" data-stars=\"{stars}\">\
{hidden}<input type=\"hidden\" name=\"sort\" value=\"trending\">\
<div class=\"panel-title\">Date Range</div>\
<label>From <output data-from-label>{from}d ago</output>\
<input type=\"range\" name=\"from\" min=\"1\" max=\"365\" value=\"{from}\"></label>\
<div class=\"range-hints\"><span>1d</span><span>1y</span></div>\
<label>To <output data-to-label>{to_label}</output>\
<input type=\"range\" name=\"to\" min=\"0\" max=\"364\" value=\"{to}\"></label>\
<div class=\"range-hints\"><span>Today</span><span>364d ago</span></div>\
<div class=\"panel-title\">Min Stars <output data-stars-label>{stars_text}+</output></div>\
<input type=\"hidden\" name=\"minStars\" value=\"{stars}\">\
<div class=\"presets\">{star_presets}</div>\
<div class=\"presets\">{window_presets}</div>\
<button type=\"submit\" class=\"apply\">Apply</button>\
</form></div>",
        label = esc(&window.label()),
        from = window.from_days(),
        to = window.to_days(),
        stars = window.min_stars(),
        stars_text = thousands(window.min_stars().into()),
    )
}

/// Page links around the current page, with first/previous/next/last.
pub fn pagination(pagination: &Pagination, params: &Params, noun: &str) -> String {
    let link = |page: u64, label: &str, enabled: bool, class: &str| {
        if enabled {
            let href = params.href().with("page", page);
            format!(
                "<a class=\"{class}\" href=\"{}\">{label}</a>",
                esc(&href.to_string())
            )
        } else {
            format!("<span class=\"{class} disabled\" aria-disabled=\"true\">{label}</span>")
        }
    };

    let window = pagination.window();
    let mut html = String::from("<nav class=\"pagination\"><div class=\"pages\">");
    html += &link(1, "««", !pagination.is_first(), "page-btn");
    html += &link(
        pagination.current.saturating_sub(1),
        "«",
        !pagination.is_first(),
        "page-btn",
    );
    if *window.start() > 1 {
        html += "<span class=\"ellipsis\">...</span>";
    }
    for page in window.clone() {
        if page == pagination.current {
            html += &format!("<span class=\"page-btn current\" aria-current=\"page\">{page}</span>");
        } else {
            html += &link(page, &page.to_string(), true, "page-btn");
        }
    }
    if *window.end() < pagination.total_pages {
        html += "<span class=\"ellipsis\">...</span>";
    }
    html += &link(
        pagination.current + 1,
        "»",
        !pagination.is_last(),
        "page-btn",
    );
    html += &link(
        pagination.total_pages,
        "»»",
        !pagination.is_last(),
        "page-btn",
    );
    html += &format!(
        "</div><div class=\"page-info\">Page {} of {} ({} {noun})</div></nav>",
        pagination.current,
        thousands(pagination.total_pages),
        thousands(pagination.total),
    );
    html
}

pub fn empty_state() -> String {
    "<div class=\"empty-state\"><div class=\"icon\">🔍</div>\
<p>No results found</p><a href=\"/\">Reset filters</a></div>"
        .to_string()
}

fn active_class(base: &str, active: bool) -> String {
    if active {
        format!("{base} active")
    } else {
        base.to_string()
    }
}
