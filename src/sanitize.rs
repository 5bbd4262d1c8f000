//! Turn the untrusted query string of the home page into bounded parameters.
//!
//! Nothing in here fails: anything malformed falls back to its default.

use std::{collections::HashMap, sync::LazyLock};

use regex::Regex;

use crate::{href::Href, trending::TrendingWindow};

pub const MAX_PAGE: u32 = 1000;
pub const MAX_QUERY_CHARS: usize = 200;
pub const MAX_LANGUAGE_CHARS: usize = 50;
pub const MAX_ORG_CHARS: usize = 100;

/// Which entities are listed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Issues,
    Repos,
    Orgs,
}

impl View {
    pub const ALL: [View; 3] = [View::Issues, View::Repos, View::Orgs];

    pub fn parse(txt: &str) -> Self {
        match txt {
            "repos" => View::Repos,
            "orgs" => View::Orgs,
            _ => View::Issues,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Issues => "issues",
            View::Repos => "repos",
            View::Orgs => "orgs",
        }
    }

    /// Number of rows per page in this view.
    pub fn page_size(&self) -> u64 {
        match self {
            View::Issues => 24,
            View::Repos | View::Orgs => 30,
        }
    }

    /// Sort applied when none is requested.
    pub fn default_sort(&self) -> SortKey {
        match self {
            View::Issues => SortKey::Newest,
            View::Repos | View::Orgs => SortKey::Issues,
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The sort keys accepted in the query string. Each view gives its own meaning to them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    Stars,
    Trending,
    Issues,
    Repos,
    Name,
}

impl SortKey {
    pub fn parse(txt: &str) -> Option<Self> {
        use SortKey::*;
        Some(match txt {
            "newest" => Newest,
            "oldest" => Oldest,
            "stars" => Stars,
            "trending" => Trending,
            "issues" => Issues,
            "repos" => Repos,
            "name" => Name,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        use SortKey::*;
        match self {
            Newest => "newest",
            Oldest => "oldest",
            Stars => "stars",
            Trending => "trending",
            Issues => "issues",
            Repos => "repos",
            Name => "name",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sanitized parameters of the home page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub view: View,
    pub q: Option<String>,
    pub language: Option<String>,
    pub org: Option<String>,
    /// 1-based
    pub page: u32,
    pub sort: Option<SortKey>,
    pub trending: TrendingWindow,
}

impl Params {
    pub fn from_query(raw: &HashMap<String, String>) -> Self {
        let get = |key: &str| raw.get(key).map(String::as_str);
        let trending = TrendingWindow::new(
            clamped(get("from"), 30, 1, 365) as u16,
            clamped(get("to"), 0, 0, 365) as u16,
            clamped(get("minStars"), 1000, 0, 1_000_000) as u32,
        );
        Self {
            view: get("view").map(View::parse).unwrap_or_default(),
            q: get("q").map(sanitize_search_query).filter(|q| !q.is_empty()),
            language: get("language").and_then(|l| truncated(l, MAX_LANGUAGE_CHARS)),
            org: get("org").and_then(|o| truncated(o, MAX_ORG_CHARS)),
            page: clamped(get("page"), 1, 1, MAX_PAGE.into()) as u32,
            sort: get("sort").and_then(SortKey::parse),
            trending,
        }
    }

    /// A free-text search lists issues, repositories and organizations together.
    pub fn is_search(&self) -> bool {
        self.q.is_some()
    }

    pub fn has_filters(&self) -> bool {
        self.q.is_some() || self.language.is_some() || self.org.is_some()
    }

    /// The requested sort, or the default sort of the current view.
    pub fn effective_sort(&self) -> SortKey {
        self.sort.unwrap_or_else(|| self.view.default_sort())
    }

    /// A link to the current page.
    ///
    /// Default values are left out; the trending window is only kept when trending is the sort.
    pub fn href(&self) -> Href {
        let mut href = Href::new();
        if self.view != View::Issues {
            href = href.with("view", self.view);
        }
        href = href
            .with_opt("q", self.q.as_deref())
            .with_opt("language", self.language.as_deref())
            .with_opt("org", self.org.as_deref())
            .with_opt("sort", self.sort);
        if self.sort == Some(SortKey::Trending) {
            href = href
                .with("from", self.trending.from_days())
                .with("to", self.trending.to_days())
                .with("minStars", self.trending.min_stars());
        }
        if self.page > 1 {
            href = href.with("page", self.page);
        }
        href
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::from_query(&HashMap::new())
    }
}

/// Strip the characters that have a meaning in the filter syntax of the data store,
/// trim, and keep at most [`MAX_QUERY_CHARS`] characters.
pub fn sanitize_search_query(input: &str) -> String {
    static RESERVED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,.()\\/]").unwrap());
    RESERVED
        .replace_all(input, "")
        .trim()
        .chars()
        .take(MAX_QUERY_CHARS)
        .collect()
}

fn truncated(txt: &str, max_chars: usize) -> Option<String> {
    let txt: String = txt.chars().take(max_chars).collect();
    (!txt.is_empty()).then_some(txt)
}

/// Read a leading integer leniently, fall back to `default`, and clamp.
///
/// Zero counts as missing, so it also falls back to `default`.
fn clamped(txt: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    txt.and_then(leading_int)
        .filter(|value| *value != 0)
        .unwrap_or(default)
        .clamp(min, max)
}

/// Parse the integer at the start of `txt`, ignoring leading whitespace and any trailing garbage.
///
/// Values too large for an `i64` saturate.
fn leading_int(txt: &str) -> Option<i64> {
    let txt = txt.trim_start();
    let (negative, digits) = match txt.as_bytes().first()? {
        b'-' => (true, &txt[1..]),
        b'+' => (false, &txt[1..]),
        _ => (false, txt),
    };
    let digits = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'));
    let mut value: Option<i64> = None;
    for d in digits {
        value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
    }
    value.map(|v| if negative { -v } else { v })
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn params(pairs: &[(&str, &str)]) -> Params {
        let raw = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Params::from_query(&raw)
    }

    #[test]
    fn defaults() {
        let p = params(&[]);
        assert_eq!(p.view, View::Issues);
        assert_eq!(p.page, 1);
        assert_eq!(p.sort, None);
        assert_eq!(p.trending, TrendingWindow::default());
        assert!(!p.has_filters());
        assert_eq!(p.href().to_string(), "/");
    }

    #[test_case("3" => 3)]
    #[test_case("0" => 1)]
    #[test_case("00" => 1)]
    #[test_case("-7" => 1)]
    #[test_case("1001" => 1000)]
    #[test_case("99999999999999999999999" => 1000)]
    #[test_case("12abc" => 12)]
    #[test_case(" 4" => 4)]
    #[test_case("abc" => 1)]
    #[test_case("" => 1)]
    fn page(txt: &str) -> u32 {
        params(&[("page", txt)]).page
    }

    #[test_case("7", "0", "100" => (7, 0, 100))]
    #[test_case("0", "0", "0" => (30, 0, 1000); "zero is missing")]
    #[test_case("-3", "2", "-10" => (1, 2, 0))]
    #[test_case("1000", "-4", "5000000" => (365, 0, 1_000_000))]
    #[test_case("x", "y", "z" => (30, 0, 1000))]
    #[test_case("30", "365", "1000" => (30, 365, 1000); "end after start is kept")]
    #[test_case("5", "10", "1000" => (5, 10, 1000); "inverted window is kept")]
    fn trending_window(from: &str, to: &str, stars: &str) -> (u16, u16, u32) {
        let w = params(&[("from", from), ("to", to), ("minStars", stars)]).trending;
        (w.from_days(), w.to_days(), w.min_stars())
    }

    #[test_case("tokio" => Some("tokio".to_string()))]
    #[test_case("  rust-lang/rust  " => Some("rust-langrust".to_string()))]
    #[test_case("a,b.c(d)e\\f" => Some("abcdef".to_string()))]
    #[test_case(" ,. " => None)]
    #[test_case("" => None)]
    fn search_query(txt: &str) -> Option<String> {
        params(&[("q", txt)]).q
    }

    #[test]
    fn search_query_is_bounded() {
        let q = params(&[("q", "é".repeat(300).as_str())]).q.unwrap();
        assert_eq!(q.chars().count(), MAX_QUERY_CHARS);
    }

    #[test]
    fn language_and_org_are_bounded() {
        let p = params(&[
            ("language", "x".repeat(80).as_str()),
            ("org", "y".repeat(150).as_str()),
        ]);
        assert_eq!(p.language.unwrap().len(), MAX_LANGUAGE_CHARS);
        assert_eq!(p.org.unwrap().len(), MAX_ORG_CHARS);
        assert_eq!(params(&[("language", "")]).language, None);
    }

    #[test_case("newest" => Some(SortKey::Newest))]
    #[test_case("oldest" => Some(SortKey::Oldest))]
    #[test_case("stars" => Some(SortKey::Stars))]
    #[test_case("trending" => Some(SortKey::Trending))]
    #[test_case("issues" => Some(SortKey::Issues))]
    #[test_case("repos" => Some(SortKey::Repos))]
    #[test_case("name" => Some(SortKey::Name))]
    #[test_case("STARS" => None)]
    #[test_case("random()" => None)]
    fn sort(txt: &str) -> Option<SortKey> {
        params(&[("sort", txt)]).sort
    }

    #[test_case("issues" => View::Issues)]
    #[test_case("repos" => View::Repos)]
    #[test_case("orgs" => View::Orgs)]
    #[test_case("users" => View::Issues)]
    fn view(txt: &str) -> View {
        params(&[("view", txt)]).view
    }

    #[test]
    fn href_keeps_trending_window_only_when_trending() {
        let p = params(&[("from", "90"), ("language", "Go"), ("page", "2")]);
        assert_eq!(p.href().to_string(), "/?language=Go&page=2");
        let p = params(&[("sort", "trending"), ("from", "90"), ("view", "issues")]);
        assert_eq!(
            p.href().to_string(),
            "/?sort=trending&from=90&to=0&minStars=1000"
        );
    }
}
